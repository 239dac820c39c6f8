//! Template resolution: merge a template document with tenant overrides and
//! content bindings into the final servable document.
//!
//! Resolution is pure and deterministic except for the `_resolvedAt` stamp.
//! The merge order is fixed and load-bearing:
//!
//! 1. copy the template document
//! 2. replace `themeOverrides` wholesale (never merged field-by-field)
//! 3. shallow-merge per-section prop patches (patch keys win)
//! 4. attach `_binding` markers (additive, after prop patches)
//! 5. stamp `_resolvedAt` and `_version`
//!
//! Overrides and bindings that reference a section id absent from the
//! template are silently ignored. A tenant override pointing at a removed
//! section must never block a deployment.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Resolver schema version stamped into every resolved document as
/// `_version`. This is the document format version, not the deployment's
/// version number.
pub const RESOLVER_SCHEMA_VERSION: &str = "1.0";

/// Connects a section to a dynamic content source (a course, a product list,
/// a feed). Attached to the resolved section as `_binding`; the renderer
/// fetches the referenced resource at display time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentBinding {
    pub section_id: String,
    pub binding_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
}

/// Resolve a template document against a tenant's customizations.
///
/// `section_overrides` maps section id to a prop patch object. Non-object
/// patch values are ignored, as are sections without a string `id`.
pub fn resolve(
    template_json: &Value,
    theme_overrides: Option<&Value>,
    section_overrides: Option<&Map<String, Value>>,
    content_bindings: Option<&[ContentBinding]>,
) -> Value {
    let mut resolved = match template_json.as_object() {
        Some(obj) => obj.clone(),
        None => Map::new(),
    };

    if let Some(theme) = theme_overrides {
        resolved.insert("themeOverrides".into(), theme.clone());
    }

    if let Some(overrides) = section_overrides {
        if let Some(Value::Array(sections)) = resolved.get_mut("sections") {
            for section in sections.iter_mut() {
                let Some(patch) = section_patch(section, overrides) else {
                    continue;
                };
                apply_prop_patch(section, &patch);
            }
        }
    }

    if let Some(bindings) = content_bindings {
        if let Some(Value::Array(sections)) = resolved.get_mut("sections") {
            for binding in bindings {
                for section in sections.iter_mut() {
                    if section_id(section) == Some(binding.section_id.as_str()) {
                        attach_binding(section, binding);
                    }
                }
            }
        }
    }

    resolved.insert("_resolvedAt".into(), Value::String(Utc::now().to_rfc3339()));
    resolved.insert(
        "_version".into(),
        Value::String(RESOLVER_SCHEMA_VERSION.into()),
    );

    Value::Object(resolved)
}

/// The section's `id` field, if it is a string.
fn section_id(section: &Value) -> Option<&str> {
    section.get("id").and_then(Value::as_str)
}

/// Look up the prop patch for a section, cloned so the section can be
/// mutated while the patch is applied.
fn section_patch(section: &Value, overrides: &Map<String, Value>) -> Option<Map<String, Value>> {
    let id = section_id(section)?;
    overrides.get(id)?.as_object().cloned()
}

/// Shallow-merge `patch` into the section's `props`. Patch keys win;
/// unpatched keys are preserved. A section without `props` gets one.
fn apply_prop_patch(section: &mut Value, patch: &Map<String, Value>) {
    let Some(section) = section.as_object_mut() else {
        return;
    };
    let props = section
        .entry("props")
        .or_insert_with(|| Value::Object(Map::new()));
    let Some(props) = props.as_object_mut() else {
        return;
    };
    for (key, value) in patch {
        props.insert(key.clone(), value.clone());
    }
}

/// Attach `_binding: { type, resourceId }` to a section. Does not touch
/// `props`, so a prop-patched section keeps its patched values.
fn attach_binding(section: &mut Value, binding: &ContentBinding) {
    let Some(section) = section.as_object_mut() else {
        return;
    };
    let mut marker = Map::new();
    marker.insert("type".into(), Value::String(binding.binding_type.clone()));
    if let Some(resource_id) = &binding.resource_id {
        marker.insert("resourceId".into(), Value::String(resource_id.clone()));
    }
    section.insert("_binding".into(), Value::Object(marker));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hero_template() -> Value {
        json!({
            "sections": [
                { "id": "s1", "type": "Hero", "props": { "title": "T" } }
            ]
        })
    }

    #[test]
    fn no_overrides_passes_template_through() {
        let resolved = resolve(&hero_template(), None, None, None);
        assert_eq!(resolved["sections"][0]["props"]["title"], "T");
        assert!(resolved.get("themeOverrides").is_none());
        assert!(resolved["_resolvedAt"].is_string());
        assert_eq!(resolved["_version"], RESOLVER_SCHEMA_VERSION);
    }

    #[test]
    fn theme_overrides_replace_wholesale() {
        let template = json!({
            "themeOverrides": { "color": "#000", "font": "serif" },
            "sections": []
        });
        let theme = json!({ "color": "#fff" });
        let resolved = resolve(&template, Some(&theme), None, None);
        // Replacement, not merge: the template's `font` key is gone.
        assert_eq!(resolved["themeOverrides"], json!({ "color": "#fff" }));
    }

    #[test]
    fn section_patch_keys_win_and_others_survive() {
        let template = json!({
            "sections": [
                { "id": "s1", "type": "Hero", "props": { "title": "T", "subtitle": "S" } }
            ]
        });
        let overrides = json!({ "s1": { "title": "New" } });
        let resolved = resolve(
            &template,
            None,
            Some(overrides.as_object().unwrap()),
            None,
        );
        assert_eq!(resolved["sections"][0]["props"]["title"], "New");
        assert_eq!(resolved["sections"][0]["props"]["subtitle"], "S");
    }

    #[test]
    fn patch_and_binding_on_same_section() {
        let overrides = json!({ "s1": { "title": "New" } });
        let bindings = vec![ContentBinding {
            section_id: "s1".into(),
            binding_type: "course".into(),
            resource_id: Some("c1".into()),
        }];
        let resolved = resolve(
            &hero_template(),
            None,
            Some(overrides.as_object().unwrap()),
            Some(&bindings),
        );
        let section = &resolved["sections"][0];
        assert_eq!(section["props"]["title"], "New");
        assert_eq!(
            section["_binding"],
            json!({ "type": "course", "resourceId": "c1" })
        );
    }

    #[test]
    fn binding_without_resource_omits_resource_id() {
        let bindings = vec![ContentBinding {
            section_id: "s1".into(),
            binding_type: "feed".into(),
            resource_id: None,
        }];
        let resolved = resolve(&hero_template(), None, None, Some(&bindings));
        assert_eq!(resolved["sections"][0]["_binding"], json!({ "type": "feed" }));
    }

    #[test]
    fn stale_override_is_silently_ignored() {
        let overrides = json!({ "removed_section": { "title": "X" } });
        let resolved = resolve(
            &hero_template(),
            None,
            Some(overrides.as_object().unwrap()),
            None,
        );
        assert_eq!(resolved["sections"][0]["props"]["title"], "T");
    }

    #[test]
    fn stale_binding_is_silently_ignored() {
        let bindings = vec![ContentBinding {
            section_id: "removed_section".into(),
            binding_type: "course".into(),
            resource_id: Some("c1".into()),
        }];
        let resolved = resolve(&hero_template(), None, None, Some(&bindings));
        assert!(resolved["sections"][0].get("_binding").is_none());
    }

    #[test]
    fn section_without_props_gains_patched_props() {
        let template = json!({
            "sections": [ { "id": "s1", "type": "Spacer" } ]
        });
        let overrides = json!({ "s1": { "height": 24 } });
        let resolved = resolve(
            &template,
            None,
            Some(overrides.as_object().unwrap()),
            None,
        );
        assert_eq!(resolved["sections"][0]["props"]["height"], 24);
    }

    #[test]
    fn unmatched_sections_pass_through_unchanged() {
        let template = json!({
            "sections": [
                { "id": "s1", "type": "Hero", "props": { "title": "T" } },
                { "id": "s2", "type": "Footer", "props": { "legal": "L" } }
            ]
        });
        let overrides = json!({ "s1": { "title": "New" } });
        let resolved = resolve(
            &template,
            None,
            Some(overrides.as_object().unwrap()),
            None,
        );
        assert_eq!(
            resolved["sections"][1],
            json!({ "id": "s2", "type": "Footer", "props": { "legal": "L" } })
        );
    }

    #[test]
    fn resolution_is_idempotent_modulo_timestamp() {
        let overrides = json!({ "s1": { "title": "New" } });
        let bindings = vec![ContentBinding {
            section_id: "s1".into(),
            binding_type: "course".into(),
            resource_id: Some("c1".into()),
        }];
        let theme = json!({ "color": "#fff" });

        let mut a = resolve(
            &hero_template(),
            Some(&theme),
            Some(overrides.as_object().unwrap()),
            Some(&bindings),
        );
        let mut b = resolve(
            &hero_template(),
            Some(&theme),
            Some(overrides.as_object().unwrap()),
            Some(&bindings),
        );
        a.as_object_mut().unwrap().remove("_resolvedAt");
        b.as_object_mut().unwrap().remove("_resolvedAt");
        assert_eq!(a, b);
    }

    #[test]
    fn content_binding_serde_is_camel_case() {
        let binding: ContentBinding = serde_json::from_value(json!({
            "sectionId": "s1",
            "bindingType": "course",
            "resourceId": "c1"
        }))
        .unwrap();
        assert_eq!(binding.section_id, "s1");
        assert_eq!(binding.binding_type, "course");
        assert_eq!(binding.resource_id.as_deref(), Some("c1"));
    }
}

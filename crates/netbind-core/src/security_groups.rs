// ── Security group resolution ──
//
// Requested groups may be given by name or by id. An exact name match
// takes priority over an id match, so a group whose *name* happens to be
// another group's id resolves to the named group.

use crate::error::CoreError;
use crate::model::SecurityGroup;

/// Map each requested name-or-id to a group id, in request order.
pub fn resolve(requested: &[String], available: &[SecurityGroup]) -> Result<Vec<String>, CoreError> {
    requested
        .iter()
        .map(|wanted| resolve_one(wanted, available))
        .collect()
}

fn resolve_one(wanted: &str, available: &[SecurityGroup]) -> Result<String, CoreError> {
    let mut name_match: Option<&str> = None;
    let mut id_match: Option<&str> = None;

    for group in available {
        if group.name == wanted {
            if name_match.is_some() {
                return Err(CoreError::NoUniqueMatch {
                    message: format!(
                        "Multiple security groups found matching '{wanted}'. Use an ID to be more specific."
                    ),
                });
            }
            name_match = Some(&group.id);
        }
        if group.id == wanted {
            id_match = Some(&group.id);
        }
    }

    name_match
        .or(id_match)
        .map(str::to_owned)
        .ok_or_else(|| CoreError::SecurityGroupNotFound {
            group: wanted.to_owned(),
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn group(id: &str, name: &str) -> SecurityGroup {
        SecurityGroup {
            id: id.into(),
            name: name.into(),
            tenant_id: Some("t1".into()),
            description: String::new(),
        }
    }

    #[test]
    fn resolves_by_name_and_by_id() {
        let groups = vec![group("sg-1", "default"), group("sg-2", "web")];
        let ids = resolve(&["web".into(), "sg-1".into()], &groups).unwrap();
        assert_eq!(ids, vec!["sg-2".to_string(), "sg-1".to_string()]);
    }

    #[test]
    fn name_match_beats_id_match() {
        // Group "sg-2" is named after the id of group "sg-1".
        let groups = vec![group("sg-1", "default"), group("sg-2", "sg-1")];
        let ids = resolve(&["sg-1".into()], &groups).unwrap();
        assert_eq!(ids, vec!["sg-2".to_string()]);
    }

    #[test]
    fn duplicate_names_are_ambiguous() {
        let groups = vec![group("sg-1", "web"), group("sg-2", "web")];
        let err = resolve(&["web".into()], &groups).unwrap_err();
        assert!(matches!(err, CoreError::NoUniqueMatch { .. }));
    }

    #[test]
    fn unmatched_group_is_not_found() {
        let groups = vec![group("sg-1", "default")];
        let err = resolve(&["missing".into()], &groups).unwrap_err();
        assert!(matches!(err, CoreError::SecurityGroupNotFound { ref group } if group == "missing"));
    }
}

use super::{RuleKind, Violation};
use crate::classify::ImportEdge;
use crate::registry::Policy;

pub const NAME: &str = "public-api";
pub const ID: &str = "FSD002";

pub const HELP: &str = "Re-export what you need from the slice's index file";

/// Crossing into another slice, or into another layer, must go through a
/// public entry. Imports that stay inside one slice may reach anything.
#[must_use]
pub fn check(edge: &ImportEdge) -> Option<Violation> {
    let to_layer = edge.to_layer()?;

    if edge.is_intra_slice() || edge.is_public_entry() {
        return None;
    }

    Some(Violation {
        rule: RuleKind::Encapsulation,
        from_layer: edge.from_layer.clone(),
        to_layer: to_layer.to_string(),
        to_slice: edge.to_slice().map(String::from),
        specifier: edge.specifier.clone(),
    })
}

/// Points the reader at the entry they should have used.
#[must_use]
pub fn message(v: &Violation, policy: &Policy) -> String {
    let roots = policy.public_roots(&v.to_layer);
    let entries: Vec<String> = match &v.to_slice {
        Some(slice) => policy
            .match_root(&v.specifier)
            .map(|(_, root)| root)
            .or_else(|| roots.first().map(String::as_str))
            .map(|root| format!("'{root}/{slice}'"))
            .into_iter()
            .collect(),
        None => roots.iter().map(|root| format!("'{root}'")).collect(),
    };

    format!(
        "Use public API: import from {} instead of internal module `{}`",
        join_alternatives(&entries),
        v.specifier
    )
}

fn join_alternatives(items: &[String]) -> String {
    match items {
        [] => "the layer's public entry".to_string(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} or {}", init.join(", "), last),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::registry::fsd_preset;

    fn policy() -> Policy {
        Policy::new(fsd_preset()).expect("preset is valid")
    }

    fn check_import(from: &str, slice: Option<&str>, specifier: &str) -> Option<Violation> {
        let edge = classify(&policy(), from, slice, specifier).expect("known layer");
        check(&edge)
    }

    #[test]
    fn slice_entry_passes() {
        assert!(check_import("widgets", Some("header"), "@entities/user").is_none());
        assert!(check_import("widgets", Some("header"), "@/entities/user").is_none());
    }

    #[test]
    fn slice_internal_fails() {
        let v = check_import("widgets", Some("header"), "@entities/user/ui/avatar")
            .expect("violation");
        assert_eq!(v.rule, RuleKind::Encapsulation);
        assert_eq!(
            message(&v, &policy()),
            "Use public API: import from '@entities/user' instead of internal module \
             `@entities/user/ui/avatar`"
        );
    }

    #[test]
    fn suggestion_keeps_the_alias_used() {
        let v = check_import("widgets", Some("header"), "@/entities/user/model")
            .expect("violation");
        assert_eq!(
            message(&v, &policy()),
            "Use public API: import from '@/entities/user' instead of internal module \
             `@/entities/user/model`"
        );
    }

    #[test]
    fn unsliced_internal_lists_every_root() {
        let v = check_import("features", Some("auth"), "@shared/lib/cn").expect("violation");
        assert_eq!(v.to_slice, None);
        assert_eq!(
            message(&v, &policy()),
            "Use public API: import from '@shared', '@shared/server' or '@/shared' \
             instead of internal module `@shared/lib/cn`"
        );
    }

    #[test]
    fn own_slice_internal_passes() {
        assert!(check_import("widgets", Some("header"), "@widgets/header/ui/logo").is_none());
    }

    #[test]
    fn layer_level_file_reaching_into_slice_fails() {
        assert!(check_import("features", None, "@features/auth/model").is_some());
    }

    #[test]
    fn join_alternatives_shapes() {
        assert_eq!(join_alternatives(&["'a'".into()]), "'a'");
        assert_eq!(join_alternatives(&["'a'".into(), "'b'".into()]), "'a' or 'b'");
    }
}

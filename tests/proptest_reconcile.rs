//! Property-based tests for VCS normalization and component grouping.

use proptest::prelude::*;
use sbom_reconcile::matching::{normalize_vcs_url, ComponentGrouping, NonPackageManagedFlag};
use sbom_reconcile::model::{BomComponent, ExternalRefType};

fn segment() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_]{1,12}"
}

fn host() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "github.com",
        "gitlab.com",
        "bitbucket.org",
        "git.example.org",
    ])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn normalize_never_panics(s in "\\PC{0,120}") {
        let _ = normalize_vcs_url(&s);
    }

    #[test]
    fn normalize_is_idempotent(
        host in host(),
        owner in segment(),
        repo in segment(),
        suffix in prop::sample::select(vec!["", ".git", "/", "/tree/main/src", "#readme"]),
    ) {
        let url = format!("https://{host}/{owner}/{repo}{suffix}");
        let once = normalize_vcs_url(&url);
        prop_assert_eq!(normalize_vcs_url(&once), once.clone());
    }

    #[test]
    fn spellings_share_one_identity(owner in segment(), repo in segment()) {
        let canonical = normalize_vcs_url(&format!("https://github.com/{owner}/{repo}"));
        prop_assert_eq!(&canonical, &format!("github.com/{}/{}", owner.to_lowercase(), repo.to_lowercase()));
        for spelling in [
            format!("git+https://github.com/{owner}/{repo}.git"),
            format!("git@github.com:{owner}/{repo}.git"),
            format!("ssh://git@github.com/{owner}/{repo}"),
            format!("https://www.github.com/{owner}/{repo}/tree/main"),
        ] {
            prop_assert_eq!(&normalize_vcs_url(&spelling), &canonical);
        }
    }

    #[test]
    fn grouping_partitions_every_component(
        entries in prop::collection::vec(
            (
                any::<bool>(),
                prop::option::of(prop::sample::select(vec![
                    "https://github.com/acme/foo",
                    "git@github.com:acme/foo.git",
                    "https://gitlab.com/acme/bar",
                    "https://github.com/acme/baz",
                    "n/a",
                ])),
            ),
            0..40,
        )
    ) {
        let components: Vec<BomComponent> = entries
            .iter()
            .enumerate()
            .map(|(i, (flagged, vcs))| {
                let mut component = BomComponent::new(format!("c{i}"), Some("1.0"))
                    .with_purl(format!("pkg:npm/c{i}@1.0"));
                if let Some(url) = vcs {
                    component = component.with_external_ref(ExternalRefType::Vcs, *url);
                }
                if *flagged {
                    component = component.with_property("nonPackageManaged", "true");
                }
                component
            })
            .collect();

        let grouping = ComponentGrouping::build(&components, &NonPackageManagedFlag::default());

        prop_assert_eq!(grouping.total_components, components.len());
        prop_assert_eq!(
            grouping.grouped_count() + grouping.non_package_managed.len() + grouping.without_vcs.len(),
            components.len()
        );
        prop_assert!(grouping.distinct_vcs_count >= grouping.groups.len());
        prop_assert!(grouping.check_consistency().is_ok());

        let without: Vec<&str> = grouping.without_vcs.iter().map(|c| c.name.as_str()).collect();
        for name in &grouping.invalid_vcs {
            prop_assert!(without.contains(&name.as_str()));
        }
        for group in grouping.groups.values() {
            for member in &group.members {
                let key = member
                    .first_reference(ExternalRefType::Vcs)
                    .map(normalize_vcs_url);
                let group_key = group.identity.key();
                prop_assert_eq!(key.as_deref(), Some(group_key.as_str()));
            }
        }
    }
}

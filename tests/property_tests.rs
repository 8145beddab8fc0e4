//! Property-based tests using proptest
//!
//! These tests verify invariants across randomized inputs, helping catch
//! edge cases that might be missed by example-based testing.

use hub_mirror::cache::{CacheLayout, check_relative, check_sub_path, download_link, relative_path};
use hub_mirror::proxy::sort_entries;
use hub_mirror::repo::is_commit_sha;
use hub_mirror::{CacheContent, FileDescribe, RepoType, RequestMethod};
use proptest::prelude::*;
use std::collections::HashMap;
use std::path::Path;

// =============================================================================
// Arbitrary Implementations
// =============================================================================

fn arb_repo_type() -> impl Strategy<Value = RepoType> {
    prop_oneof![
        Just(RepoType::Models),
        Just(RepoType::Datasets),
        Just(RepoType::Spaces),
    ]
}

/// Listing rows with names drawn from a small alphabet so duplicates and
/// shared prefixes show up often
fn arb_file_describe() -> impl Strategy<Value = FileDescribe> {
    ("[a-cA-C0-9._-]{1,6}", any::<bool>(), 0u64..1_000_000).prop_map(|(name, is_dir, size)| {
        FileDescribe {
            link: if is_dir {
                String::new()
            } else {
                format!("https://mirror.example.com/models/o/r/resolve/c/{}", name)
            },
            name,
            size: if is_dir { 0 } else { size },
            is_dir,
        }
    })
}

fn arb_segment() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9][a-zA-Z0-9._-]{0,15}"
}

// =============================================================================
// Listing order
// =============================================================================

proptest! {
    #[test]
    fn sort_puts_every_directory_before_every_file(
        mut entries in prop::collection::vec(arb_file_describe(), 0..40)
    ) {
        sort_entries(&mut entries);

        if let Some(first_file) = entries.iter().position(|e| !e.is_dir) {
            prop_assert!(entries[first_file..].iter().all(|e| !e.is_dir));
        }
    }

    #[test]
    fn sort_orders_names_within_each_group(
        mut entries in prop::collection::vec(arb_file_describe(), 0..40)
    ) {
        sort_entries(&mut entries);

        for pair in entries.windows(2) {
            if pair[0].is_dir == pair[1].is_dir {
                prop_assert!(pair[0].name.as_bytes() <= pair[1].name.as_bytes());
            }
        }
    }

    #[test]
    fn sort_is_a_permutation(entries in prop::collection::vec(arb_file_describe(), 0..40)) {
        let mut sorted = entries.clone();
        sort_entries(&mut sorted);

        let mut before: Vec<_> = entries.iter().map(|e| (e.name.clone(), e.is_dir)).collect();
        let mut after: Vec<_> = sorted.iter().map(|e| (e.name.clone(), e.is_dir)).collect();
        before.sort();
        after.sort();
        prop_assert_eq!(before, after);
    }

    #[test]
    fn sort_is_idempotent(mut entries in prop::collection::vec(arb_file_describe(), 0..40)) {
        sort_entries(&mut entries);
        let once = entries.clone();
        sort_entries(&mut entries);
        prop_assert_eq!(once, entries);
    }
}

// =============================================================================
// Cache layout
// =============================================================================

proptest! {
    #[test]
    fn meta_paths_never_collide_across_methods(
        repo_type in arb_repo_type(),
        org in arb_segment(),
        repo in arb_segment(),
        revision in arb_segment(),
    ) {
        let layout = CacheLayout::new("/cache");
        let org_repo = format!("{}/{}", org, repo);

        let head = layout.meta_path(repo_type, &org_repo, &revision, RequestMethod::Head);
        let get = layout.meta_path(repo_type, &org_repo, &revision, RequestMethod::Get);

        prop_assert_ne!(&head, &get);
        prop_assert_eq!(head.parent(), get.parent());
        prop_assert!(head.starts_with(Path::new("/cache/api").join(repo_type.as_str())));
    }

    #[test]
    fn listing_dir_ignores_surrounding_slashes(
        repo_type in arb_repo_type(),
        parts in prop::collection::vec(arb_segment(), 1..4),
    ) {
        let layout = CacheLayout::new("/cache");
        let sub = parts.join("/");
        let padded = format!("/{}/", sub);

        prop_assert_eq!(
            layout.paths_info_dir(repo_type, "org/repo", "c0ffee", &sub),
            layout.paths_info_dir(repo_type, "org/repo", "c0ffee", &padded)
        );
    }

    #[test]
    fn relative_path_ends_with_entry_name(
        parts in prop::collection::vec(arb_segment(), 0..4),
        name in arb_segment(),
    ) {
        let sub = parts.join("/");
        let rel = relative_path(&sub, &name);

        prop_assert!(!rel.starts_with('/'));
        prop_assert!(!rel.contains("//"));
        prop_assert!(rel.ends_with(&name));
        if sub.is_empty() {
            prop_assert_eq!(rel, name);
        }
    }

    #[test]
    fn download_link_has_single_separator_after_domain(
        repo_type in arb_repo_type(),
        trailing_slash in any::<bool>(),
        name in arb_segment(),
    ) {
        let domain = if trailing_slash {
            "https://mirror.example.com/"
        } else {
            "https://mirror.example.com"
        };
        let link = download_link(domain, repo_type, "org/repo", "c0ffee", &name);

        let expected = format!(
            "https://mirror.example.com/{}/org/repo/resolve/c0ffee/{}",
            repo_type, name
        );
        prop_assert_eq!(link, expected);
    }
}

proptest! {
    #[test]
    fn plain_segments_pass_path_check(parts in prop::collection::vec(arb_segment(), 1..5)) {
        let joined = parts.join("/");
        prop_assert!(check_relative(&joined).is_ok());
        let sub_path = format!("/{}/", joined);
        prop_assert!(check_sub_path(&sub_path).is_ok());
    }

    #[test]
    fn parent_segment_anywhere_fails_path_check(
        before in prop::collection::vec(arb_segment(), 0..3),
        after in prop::collection::vec(arb_segment(), 0..3),
    ) {
        let mut parts = before;
        parts.push("..".to_string());
        parts.extend(after);
        let joined = parts.join("/");

        prop_assert!(check_relative(&joined).is_err());
        prop_assert!(check_sub_path(&joined).is_err());
    }
}

// =============================================================================
// Stored content
// =============================================================================

proptest! {
    #[test]
    fn stored_body_is_hex_and_survives_reload(
        status in 100u16..600,
        body in prop::collection::vec(any::<u8>(), 0..256),
        etag in "[a-f0-9]{8}",
    ) {
        let mut headers = HashMap::new();
        headers.insert("etag".to_string(), etag);
        let content = CacheContent::new(status, headers, body.clone());

        let raw = content.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&raw).unwrap();
        let encoded = value["content"].as_str().unwrap();
        prop_assert_eq!(encoded.len(), body.len() * 2);
        prop_assert!(encoded.bytes().all(|b| b.is_ascii_hexdigit()));

        let reloaded = CacheContent::from_json(&raw).unwrap();
        prop_assert_eq!(reloaded.body(), body.as_slice());
        prop_assert_eq!(reloaded, content);
    }

    #[test]
    fn commit_sha_requires_forty_hex_chars(revision in "[0-9a-f]{1,60}") {
        prop_assert_eq!(is_commit_sha(&revision), revision.len() == 40);
    }

    #[test]
    fn branch_names_are_not_commits(revision in "[g-z][a-z0-9._-]{0,39}") {
        prop_assert!(!is_commit_sha(&revision));
    }
}

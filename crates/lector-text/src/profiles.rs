//! Reading profiles
//!
//! Baseline read/skip rules plus named profile refinements. The baseline is
//! profile-independent: headers, footers, and page numbers are never read;
//! captions are read only when requested. Named profiles layer on top and are
//! currently no-ops pending richer semantic role data; an unrecognized
//! profile name falls back to baseline-only behavior rather than failing.

use lector_core::{Block, Policy, Role};

/// Assign a read/skip policy to every block.
pub fn apply_profile(blocks: &mut [Block], profile: &str, include_captions: bool) {
    tracing::info!(profile, include_captions, "Applying reading profile");

    let refinement = match profile {
        "academic" => Some(academic as fn(&mut Block)),
        "news" => Some(news as fn(&mut Block)),
        "report" => Some(report as fn(&mut Block)),
        other => {
            tracing::warn!(profile = other, "Unknown profile, using baseline rules only");
            None
        }
    };

    for block in blocks.iter_mut() {
        block.policy = baseline_policy(block.role, include_captions);
        if let Some(refine) = refinement {
            refine(block);
        }
    }
}

/// Profile-independent rules.
fn baseline_policy(role: Role, include_captions: bool) -> Policy {
    match role {
        Role::Header | Role::Footer | Role::PageNum => Policy::Skip,
        Role::Caption if !include_captions => Policy::Skip,
        _ => Policy::Read,
    }
}

/// Academic-paper refinements. Skipping affiliations and reference sections
/// needs semantic role labeling the pipeline does not produce yet.
fn academic(_block: &mut Block) {}

/// News-article refinements (bylines, datelines). Pending semantic roles.
fn news(_block: &mut Block) {}

/// Report refinements (legal boilerplate). Pending semantic roles.
fn report(_block: &mut Block) {}

#[cfg(test)]
mod tests {
    use super::*;
    use lector_core::BBox;

    fn block(role: Role) -> Block {
        Block {
            id: "b".to_string(),
            page: 0,
            bbox: BBox::new(0.0, 0.0, 1.0, 1.0),
            column: 0,
            role,
            text: String::new(),
            sentences: Vec::new(),
            policy: Policy::Read,
            confidence: 1.0,
        }
    }

    #[test]
    fn test_baseline_skips() {
        for role in [Role::Header, Role::Footer, Role::PageNum] {
            let mut blocks = vec![block(role)];
            apply_profile(&mut blocks, "academic", false);
            assert_eq!(blocks[0].policy, Policy::Skip, "{role:?}");
        }
    }

    #[test]
    fn test_baseline_reads() {
        for role in [Role::Title, Role::Heading, Role::Body, Role::ListItem, Role::Quote, Role::Unknown] {
            let mut blocks = vec![block(role)];
            apply_profile(&mut blocks, "academic", false);
            assert_eq!(blocks[0].policy, Policy::Read, "{role:?}");
        }
    }

    #[test]
    fn test_caption_follows_flag() {
        let mut blocks = vec![block(Role::Caption)];
        apply_profile(&mut blocks, "academic", false);
        assert_eq!(blocks[0].policy, Policy::Skip);

        apply_profile(&mut blocks, "academic", true);
        assert_eq!(blocks[0].policy, Policy::Read);
    }

    #[test]
    fn test_unknown_profile_fails_open() {
        let mut blocks = vec![block(Role::Body), block(Role::Footer)];
        apply_profile(&mut blocks, "no-such-profile", false);
        assert_eq!(blocks[0].policy, Policy::Read);
        assert_eq!(blocks[1].policy, Policy::Skip);
    }

    #[test]
    fn test_profiles_match_baseline_for_now() {
        for profile in ["academic", "news", "report"] {
            let mut blocks = vec![block(Role::Body), block(Role::Header)];
            apply_profile(&mut blocks, profile, false);
            assert_eq!(blocks[0].policy, Policy::Read);
            assert_eq!(blocks[1].policy, Policy::Skip);
        }
    }
}

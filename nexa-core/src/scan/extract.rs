use nexa_contracts::agent::{Hints, MetadataAgent, ScanUnit};
use nexa_contracts::error::CoreResult;
use std::sync::Arc;

/// Runs every agent supporting the unit's library type, in `(category,
/// default_order)` order, merging hints with provenance. A later agent's
/// hint for the same key appends rather than replaces — whether it wins
/// depends on the Normalize stage respecting locked fields on the
/// existing item, per spec.md §4.B step 5.
pub async fn extract(agents: &[Arc<dyn MetadataAgent>], unit: &ScanUnit) -> CoreResult<Vec<Hints>> {
    let mut ordered: Vec<&Arc<dyn MetadataAgent>> = agents
        .iter()
        .filter(|a| a.supported_library_types().contains(&unit.library_type))
        .collect();
    ordered.sort_by_key(|a| (a.category(), a.default_order()));

    let mut all_hints = Vec::with_capacity(ordered.len());
    for agent in ordered {
        match agent.extract(unit).await {
            Ok(mut hints) => {
                hints.provenance = Some(agent.agent_name().to_string());
                all_hints.push(hints);
            }
            Err(e) => {
                tracing::warn!(agent = agent.agent_name(), error = %e, "metadata agent extraction failed");
            }
        }
    }
    Ok(all_hints)
}

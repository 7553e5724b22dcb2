use crate::query_manager::ResolvedSet;
use crate::{printwarn, QueryError, ResultRecord};

/**
 * Split {records} into the record named exactly {target} and everything else.
 * The rest is sorted by Popularity, descending. Ties keep their upstream order.
 */
pub fn resolve(target: &str, records: Vec<ResultRecord>) -> Result<ResolvedSet, QueryError> {
    let mut exact_match: Option<ResultRecord> = None;
    let mut rest: Vec<ResultRecord> = Vec::with_capacity(records.len());

    for record in records {
        if record.name() != target {
            rest.push(record);
            continue;
        }
        // Upstream names are unique. If they are not, the last one scanned wins.
        if exact_match.is_some() {
            printwarn!("Found more than one result named '{target}', using the last one");
        }
        exact_match = Some(record);
    }

    let mut scored = rest.into_iter()
        .map(|record| Ok((record.popularity_score()?, record)))
        .collect::<Result<Vec<(f64, ResultRecord)>, QueryError>>()?;

    // sort_by is stable.
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));

    return Ok(ResolvedSet {
        exact_match,
        alternatives: scored.into_iter().map(|(_, record)| record).collect(),
    });
}

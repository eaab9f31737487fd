use crate::normalize::normalize;
use crate::types::OpportunityRecord;

/// Case-insensitive keyword browse over every column. An empty keyword matches all.
pub fn search_opportunities<'a>(
    opportunities: &'a [OpportunityRecord],
    keyword: &str,
) -> Vec<&'a OpportunityRecord> {
    let keyword = normalize(keyword);
    if keyword.is_empty() {
        return opportunities.iter().collect();
    }

    opportunities
        .iter()
        .filter(|o| {
            let text = format!("{} {} {} {}", o.title, o.requirements, o.location, o.mode)
                .to_lowercase();
            text.contains(&keyword)
        })
        .collect()
}

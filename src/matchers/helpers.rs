use super::Predicate;

/// 状态文本是否命中谓词
pub fn predicate_matches(target: &str, predicate: &Predicate) -> bool {
    let target = target.trim().to_lowercase();
    matches_normalized(&target, predicate)
}

/// 任一谓词命中即为真
pub fn any_matches(target: &str, predicates: &[Predicate]) -> bool {
    let target = target.trim().to_lowercase();
    predicates.iter().any(|p| matches_normalized(&target, p))
}

fn matches_normalized(target: &str, predicate: &Predicate) -> bool {
    match predicate {
        Predicate::Equals { value } => target == value.trim().to_lowercase(),
        Predicate::Contains { value } => target.contains(&value.to_lowercase()),
        Predicate::StartsWith { value } => target.starts_with(&value.to_lowercase()),
        Predicate::All { of } => !of.is_empty() && of.iter().all(|p| matches_normalized(target, p)),
    }
}

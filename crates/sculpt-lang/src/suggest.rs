//! "Did you mean" candidates for unknown symbols, members and fonts.
//!
//! A hand-written alias table is consulted first, since people coming from
//! other modelling tools reach for names like `box` or `translate`. Failing
//! that, candidates are ranked by Damerau-Levenshtein distance.

/// Common names from other tools, mapped to the names used here.
const ALTERNATIVES: &[(&str, &[&str])] = &[
    ("box",          &["cube"]),
    ("cuboid",       &["cube"]),
    ("ball",         &["sphere"]),
    ("rect",         &["square"]),
    ("rectangle",    &["square"]),
    ("ellipse",      &["circle"]),
    ("oval",         &["circle"]),
    ("colour",       &["color"]),
    ("alpha",        &["opacity"]),
    ("transparency", &["opacity"]),
    ("move",         &["translate", "position"]),
    ("offset",       &["translate", "position"]),
    ("rotation",     &["rotate", "orientation"]),
    ("scaling",      &["scale", "size"]),
    ("dimensions",   &["size"]),
    ("let",          &["define"]),
    ("var",          &["define"]),
    ("const",        &["define"]),
    ("func",         &["define"]),
    ("function",     &["define"]),
    ("fn",           &["define"]),
    ("subtract",     &["difference"]),
    ("sub",          &["difference"]),
    ("minus",        &["difference"]),
    ("add",          &["union"]),
    ("combine",      &["union", "group"]),
    ("merge",        &["union"]),
    ("intersect",    &["intersection"]),
    ("print",        &["debug"]),
    ("log",          &["debug"]),
    ("x",            &["width"]),
    ("y",            &["height"]),
    ("z",            &["depth"]),
    ("grey",         &["gray"]),
    ("purple",       &["magenta"]),
    ("pink",         &["magenta"]),
    ("loop",         &["for"]),
    ("while",        &["for"]),
    ("include",      &["import"]),
    ("require",      &["import"]),
    ("resolution",   &["detail"]),
    ("segments",     &["detail"]),
    ("polygon",      &["path"]),
    ("polyline",     &["path"]),
    ("line",         &["path"]),
    ("revolve",      &["lathe"]),
    ("sweep",        &["extrude"]),
    ("linear_extrude", &["extrude"]),
    ("rotate_extrude", &["lathe"]),
];

/// The single best suggestion for `query` among `options`, if any.
pub fn best_match<S: AsRef<str>>(query: &str, options: &[S]) -> Option<String> {
    if let Some(alias) = alternative(query, options) {
        return Some(alias);
    }
    best_matches(query, options).into_iter().next()
}

/// Curated aliases that are actually available among `options`.
fn alternative<S: AsRef<str>>(query: &str, options: &[S]) -> Option<String> {
    let query = query.to_lowercase();
    let (_, aliases) = ALTERNATIVES.iter().find(|(name, _)| *name == query)?;
    aliases.iter().find_map(|alias| {
        options
            .iter()
            .map(AsRef::as_ref)
            .find(|o| o.eq_ignore_ascii_case(alias))
            .map(str::to_string)
    })
}

/// All plausible candidates, closest first.
///
/// A candidate survives when it shares a prefix with the query or lies
/// within half the query's length in edit distance. Comparison ignores case,
/// so a name that differs only in case ranks first. Ties go to the longer
/// shared prefix.
pub fn best_matches<S: AsRef<str>>(query: &str, options: &[S]) -> Vec<String> {
    let query = query.to_lowercase();
    let limit = query.chars().count() / 2;
    let mut scored: Vec<(usize, usize, &str)> = options
        .iter()
        .map(AsRef::as_ref)
        .filter_map(|option| {
            let lower = option.to_lowercase();
            let distance = edit_distance(&query, &lower);
            let prefix = common_prefix(&query, &lower);
            if prefix == 0 && distance > limit { return None; }
            Some((distance, prefix, option))
        })
        .collect();
    scored.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));
    scored.into_iter().map(|(_, _, o)| o.to_string()).collect()
}

fn common_prefix(a: &str, b: &str) -> usize {
    a.chars().zip(b.chars()).take_while(|(x, y)| x == y).count()
}

/// Optimal-string-alignment distance: Levenshtein plus adjacent transposition.
fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() { return b.len(); }
    if b.is_empty() { return a.len(); }

    let mut before: Vec<usize> = vec![0; b.len() + 1];
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            let mut d = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
            if i > 1 && j > 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                d = d.min(before[j - 2] + 1);
            }
            curr[j] = d;
        }
        std::mem::swap(&mut before, &mut prev);
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance() {
        assert_eq!(edit_distance("qube", "cube"), 1);
        assert_eq!(edit_distance("cbue", "cube"), 1);
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("kitten", "sitting"), 3);
    }

    #[test]
    fn closest_candidate_wins() {
        let options = ["cube", "sphere", "cylinder"];
        assert_eq!(best_match("qube", &options).as_deref(), Some("cube"));
        assert_eq!(best_match("spere", &options).as_deref(), Some("sphere"));
    }

    #[test]
    fn case_only_difference_ranks_first() {
        let options = ["cone", "cube", "sphere"];
        assert_eq!(best_match("Cube", &options).as_deref(), Some("cube"));
        assert_eq!(best_matches("SPHERE", &options)[0], "sphere");
    }

    #[test]
    fn unrelated_names_are_dropped() {
        assert_eq!(best_match("zzzzzz", &["cube", "sphere"]), None);
    }

    #[test]
    fn aliases_beat_edit_distance() {
        // "rect" is one edit away from "rest", but the alias table points at "square".
        let options = ["rest", "square", "circle"];
        assert_eq!(best_match("rect", &options).as_deref(), Some("square"));
        assert_eq!(best_match("Box", &["cube", "bo"]).as_deref(), Some("cube"));
    }

    #[test]
    fn alias_ignored_when_unavailable() {
        assert_eq!(best_match("box", &["bot"]).as_deref(), Some("bot"));
    }

    #[test]
    fn ties_prefer_longer_prefix() {
        let options = ["bat", "cab"];
        assert_eq!(best_matches("cat", &options), vec!["cab".to_string(), "bat".to_string()]);
    }
}

//! Label text for markers
//!
//! Labels end up inside a JSONP envelope that is parsed by browsers, so only a
//! small whitelist of characters is allowed through.

const LABEL_CHARSET: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789 -/.,<>";

/// Strip every character outside the label whitelist.
pub fn sanitize(input: &str) -> String {
    input.chars().filter(|c| LABEL_CHARSET.contains(*c)).collect()
}

/// Build a `"{keywords},{authors}"` label from raw comma-separated metadata.
///
/// At most two keywords and two author surnames are kept; three or more
/// authors collapse to `"first,et al."`. A single keyword or author keeps a
/// trailing comma so the client can always split into four fields.
pub fn compose(authors: &str, keywords: &str) -> String {
    let surnames: Vec<&str> = authors
        .splitn(3, ',')
        .map(|au| au.rsplit('.').next().unwrap_or(au))
        .collect();
    let au = match surnames.as_slice() {
        [] => ",".to_string(),
        [one] => format!("{one},"),
        [first, second] => format!("{first},{second}"),
        [first, ..] => format!("{first},et al."),
    };

    let kws: Vec<&str> = keywords.splitn(3, ',').collect();
    let kw = match kws.as_slice() {
        [] | [_] => format!("{keywords},"),
        [_, _] => keywords.to_string(),
        [first, second, ..] => format!("{first},{second}"),
    };

    sanitize(&format!("{kw},{au}"))
}

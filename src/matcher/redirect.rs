/// Resolve a redirect slug against the current path.
///
/// - An empty slug keeps the current path.
/// - An absolute slug (`/login`) replaces the path outright.
/// - A relative slug is appended to the leading segments of `path` that
///   correspond to the parent pattern, so `slug` under `/team/:tid` on
///   `/team/7` resolves to `/team/7/slug`.
#[must_use]
pub fn redirect_url(path: &str, parent_pattern: Option<&str>, slug: &str) -> String {
    if slug.is_empty() {
        return path.to_string();
    }
    if slug.starts_with('/') {
        return slug.to_string();
    }

    let depth = parent_pattern.map_or(0, |p| segments(p).count());
    let kept: Vec<&str> = segments(path).take(depth).collect();

    if kept.is_empty() {
        format!("/{slug}")
    } else {
        format!("/{}/{}", kept.join("/"), slug)
    }
}

fn segments(url: &str) -> impl Iterator<Item = &str> {
    url.split('/').filter(|p| !p.is_empty())
}

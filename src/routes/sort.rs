//! Route specificity ordering.
//!
//! # Ordering
//! - Non-dynamic routes precede dynamic routes
//! - Dynamic routes compare segment by segment, left to right:
//!   literal > `[param]` > `[...catchAll]` > `[[...optional]]`
//! - The first differing segment decides; a route whose ranks are a strict
//!   prefix of another's sorts first
//! - Equal specificity keeps discovery order (stable sort)
//!
//! The router walks the resulting order verbatim, so first match is most
//! specific match.

use std::cmp::Ordering;

use super::Route;

/// Compare two routes by specificity.
pub fn compare(a: &Route, b: &Route) -> Ordering {
    a.is_dynamic().cmp(&b.is_dynamic()).then_with(|| {
        a.segments()
            .iter()
            .map(|s| s.rank())
            .cmp(b.segments().iter().map(|s| s.rank()))
    })
}

/// Sort routes in place, most specific first.
pub fn sort_routes(routes: &mut [Route]) {
    routes.sort_by(compare);
}

/// Sort an owned route list, most specific first.
pub fn sorted(mut routes: Vec<Route>) -> Vec<Route> {
    sort_routes(&mut routes);
    routes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::classify;

    fn routes(templates: &[&str]) -> Vec<Route> {
        templates
            .iter()
            .map(|t| classify(t, &format!("pages{t}.js")).unwrap())
            .collect()
    }

    fn templates(routes: &[Route]) -> Vec<&str> {
        routes.iter().map(Route::template).collect()
    }

    #[test]
    fn test_static_before_dynamic() {
        let sorted = sorted(routes(&["/[slug]", "/post", "/blog/[id]", "/about"]));
        assert_eq!(templates(&sorted), ["/post", "/about", "/blog/[id]", "/[slug]"]);
    }

    #[test]
    fn test_literal_beats_param_beats_catch_all() {
        let sorted = sorted(routes(&[
            "/[...all]",
            "/[[...opt]]",
            "/[slug]",
            "/blog/[...rest]",
            "/blog/[id]",
        ]));
        assert_eq!(
            templates(&sorted),
            ["/blog/[id]", "/blog/[...rest]", "/[slug]", "/[...all]", "/[[...opt]]"]
        );
    }

    #[test]
    fn test_first_differing_segment_decides() {
        let sorted = sorted(routes(&["/[a]/x/[b]", "/[a]/[b]/x"]));
        assert_eq!(templates(&sorted), ["/[a]/x/[b]", "/[a]/[b]/x"]);
    }

    #[test]
    fn test_ties_keep_discovery_order() {
        let sorted = sorted(routes(&["/shop/[id]", "/blog/[id]", "/news/[id]"]));
        assert_eq!(templates(&sorted), ["/shop/[id]", "/blog/[id]", "/news/[id]"]);
    }

    #[test]
    fn test_sort_is_idempotent() {
        let input = routes(&[
            "/[...all]",
            "/x/[y]",
            "/about",
            "/[a]/[b]",
            "/x/[[...z]]",
            "/[a]",
            "/x/y",
        ]);
        let once = sorted(input);
        let twice = sorted(once.clone());
        assert_eq!(once, twice);
    }
}

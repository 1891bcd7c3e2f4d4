//! Route finding over the map graph.
//!
//! A depth-first search that only follows links of the allowed modes, never
//! passes through a terminal dot (it may only end there) and never revisits a
//! dot already on the current path. The route with the fewest dots wins; among
//! equally short routes the first one found, in link declaration order, wins.

use std::collections::BTreeMap;

use super::data::{Dot, World};

/// Shortest route from `src` to `dst` (both dot ids), including both ends.
pub fn find_route(
    dots: &BTreeMap<String, Dot>,
    src: &str,
    dst: &str,
    modes: &str,
) -> Option<Vec<String>> {
    let mut best: Option<Vec<String>> = None;
    let mut path = vec![src.to_string()];
    search(dots, src, dst, modes, &mut path, &mut best);
    best
}

fn search(
    dots: &BTreeMap<String, Dot>,
    at: &str,
    dst: &str,
    modes: &str,
    path: &mut Vec<String>,
    best: &mut Option<Vec<String>>,
) {
    let Some(dot) = dots.get(at) else {
        return;
    };

    for link in &dot.links {
        // anything from here is at least one dot longer
        if let Some(b) = best {
            if path.len() + 1 >= b.len() {
                return;
            }
        }

        if !modes.contains(link.mode) {
            continue;
        }

        if link.to == dst {
            let mut found = path.clone();
            found.push(link.to.clone());
            *best = Some(found);
            // cannot route through a destination
            continue;
        }

        let terminal = dots.get(&link.to).map(|d| d.terminal).unwrap_or(true);
        if terminal || path.contains(&link.to) {
            continue;
        }

        path.push(link.to.clone());
        search(dots, &link.to, dst, modes, path, best);
        path.pop();
    }
}

impl World {
    /// Route between two places, as dot ids. Routes shorter than two dots are
    /// not journeys and count as no route.
    pub fn find_route(&self, from: &str, to: &str, modes: &str) -> Option<Vec<String>> {
        let src = &self.places.get(from)?.dot;
        let dst = &self.places.get(to)?.dot;
        find_route(&self.dots, src, dst, modes).filter(|r| r.len() >= 2)
    }
}

//! Page-view loaders
//!
//! A [`PageContext`] lives for one page view and carries the state that used
//! to be shared between renders (the last backdrop shown). The loaders fan out
//! every independent request of a page at once and hand back a complete,
//! already degraded-where-needed view model.

use crate::catalog::{Carousel, Catalog};
use crate::metadata_retrieval::{CastMember, Lookup, MovieDetail, MovieSummary, TrailerRef};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

/// Per-page-view state.
#[derive(Debug)]
pub struct PageContext<R = StdRng> {
    last_backdrop: Option<String>,
    rng: R,
}

impl PageContext<StdRng> {
    /// Creates a context seeded from the operating system
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }
}

impl Default for PageContext<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> PageContext<R> {
    /// Creates a context drawing randomness from `rng`
    pub fn with_rng(rng: R) -> Self {
        Self {
            last_backdrop: None,
            rng,
        }
    }

    /// The backdrop picked most recently
    pub fn last_backdrop(&self) -> Option<&str> {
        self.last_backdrop.as_deref()
    }

    /// Picks a random backdrop, avoiding the previous pick whenever another
    /// candidate exists.
    pub fn pick_backdrop(&mut self, candidates: &[String]) -> Option<String> {
        let fresh: Vec<&String> = candidates
            .iter()
            .filter(|c| Some(c.as_str()) != self.last_backdrop.as_deref())
            .collect();

        let choice = if fresh.is_empty() {
            candidates.choose(&mut self.rng)?.clone()
        } else {
            (*fresh.choose(&mut self.rng)?).clone()
        };

        self.last_backdrop = Some(choice.clone());
        Some(choice)
    }
}

/// Everything the homepage shows.
#[derive(Debug, Clone, PartialEq)]
pub struct Homepage {
    pub popular: Vec<MovieSummary>,
    pub trending: Vec<MovieSummary>,
    pub now_playing: Vec<MovieSummary>,
    /// Hero backdrop picked from the trending listing
    pub backdrop: Option<String>,
}

/// Everything the movie detail page shows.
#[derive(Debug, Clone, PartialEq)]
pub struct MoviePage {
    pub detail: Lookup<MovieDetail>,
    pub cast: Vec<CastMember>,
    pub recommendations: Vec<MovieSummary>,
    pub trailer: Option<TrailerRef>,
}

/// Loads the three homepage carousels concurrently and picks a backdrop.
pub async fn load_homepage<R: Rng>(catalog: &Catalog, ctx: &mut PageContext<R>) -> Homepage {
    let (popular, trending, now_playing): (Carousel, Carousel, Carousel) = futures::join!(
        catalog.popular(),
        catalog.trending(),
        catalog.now_playing()
    );

    Homepage {
        backdrop: ctx.pick_backdrop(&trending.backdrops),
        popular: popular.movies,
        trending: trending.movies,
        now_playing: now_playing.movies,
    }
}

/// Loads a movie page.
///
/// The detail record and the TMDb counterpart are looked up concurrently;
/// once the counterpart is known, cast, recommendations and trailer are
/// fetched concurrently. Each part degrades on its own.
pub async fn load_movie_page(catalog: &Catalog, external_id: &str) -> MoviePage {
    let resolver = catalog.resolver();
    let (detail, secondary) = futures::join!(
        catalog.movie_detail(external_id),
        resolver.find_secondary_record(external_id)
    );

    let Some(secondary) = secondary else {
        tracing::debug!(external_id, "No TMDb counterpart, skipping enrichment");
        return MoviePage {
            detail,
            cast: Vec::new(),
            recommendations: Vec::new(),
            trailer: None,
        };
    };

    let (cast, recommendations, trailer) = futures::join!(
        catalog.cast_for(secondary.id),
        catalog.recommendations_for(secondary.id),
        catalog.trailer_for(secondary.id)
    );

    MoviePage {
        detail,
        cast,
        recommendations,
        trailer,
    }
}

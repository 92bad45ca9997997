//! Starting material for a fresh deck

use rand::seq::SliceRandom;

use crate::models::{Track, TrackOrigin};

/// Catalog queries a new deck is drawn from
pub const SEED_GENRES: [&str; 6] = [
    "top pop hits",
    "today's hits",
    "classic rock",
    "90s hip hop",
    "indie alternative",
    "summer party",
];

pub fn random_genre() -> &'static str {
    SEED_GENRES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(SEED_GENRES[0])
}

const PREVIEW_BASE: &str = "https://audio-ssl.itunes.apple.com/itunes-assets";

/// A built-in fallback card
struct SeedTrack {
    title: &'static str,
    artist: &'static str,
    /// picsum seed for the artwork
    art: &'static str,
    /// path under the iTunes preview host
    preview: &'static str,
}

const SEED_DECK: [SeedTrack; 10] = [
    SeedTrack {
        title: "Blinding Lights",
        artist: "The Weeknd",
        art: "blindinglights",
        preview: "AudioPreview125/v4/83/29/38/832938b8-22f3-8f35-912f-410a300d1a49/mzaf_1241926673892742910.plus.aac.p.m4a",
    },
    SeedTrack {
        title: "As It Was",
        artist: "Harry Styles",
        art: "asitwas",
        preview: "AudioPreview112/v4/93/63/1f/93631f79-c567-c20e-c287-418f4803986a/mzaf_14675765053075249454.plus.aac.p.m4a",
    },
    SeedTrack {
        title: "bad guy",
        artist: "Billie Eilish",
        art: "badguy",
        preview: "AudioPreview115/v4/37/c2/31/37c23171-5582-1456-4279-99419130bfde/mzaf_10214249339314416108.plus.aac.p.m4a",
    },
    SeedTrack {
        title: "Levitating",
        artist: "Dua Lipa",
        art: "levitating",
        preview: "AudioPreview125/v4/21/5a/83/215a8397-9430-b186-3507-681da4613768/mzaf_7825700986989985956.plus.aac.p.m4a",
    },
    SeedTrack {
        title: "good 4 u",
        artist: "Olivia Rodrigo",
        art: "good4u",
        preview: "AudioPreview122/v4/8a/7a/8a/8a7a8a1f-4e6f-0e54-633b-73595166258f/mzaf_17215358618780131135.plus.aac.p.m4a",
    },
    SeedTrack {
        title: "Bohemian Rhapsody",
        artist: "Queen",
        art: "queen",
        preview: "AudioPreview125/v4/d1/1f/53/d11f5344-4b59-25f3-7a91-9e7314d3e593/mzaf_13809627763321453961.plus.aac.p.m4a",
    },
    SeedTrack {
        title: "Smells Like Teen Spirit",
        artist: "Nirvana",
        art: "nirvana",
        preview: "AudioPreview125/v4/b4/2a/88/b42a8800-74f0-2f47-868a-156c45f47ed4/mzaf_12920950379201944222.plus.aac.p.m4a",
    },
    SeedTrack {
        title: "Get Lucky",
        artist: "Daft Punk ft. Pharrell Williams",
        art: "daftpunk",
        preview: "AudioPreview125/v4/10/86/e5/1086e5c8-2b87-578d-6973-195f13d8a9e0/mzaf_16279933596814704815.plus.aac.p.m4a",
    },
    SeedTrack {
        title: "Rolling in the Deep",
        artist: "Adele",
        art: "adele",
        preview: "AudioPreview125/v4/f4/37/95/f437951d-93d1-4148-18e3-0d346069f109/mzaf_18357113113944795360.plus.aac.p.m4a",
    },
    SeedTrack {
        title: "Uptown Funk",
        artist: "Mark Ronson ft. Bruno Mars",
        art: "uptownfunk",
        preview: "AudioPreview125/v4/05/ae/38/05ae3815-592f-576f-a4d3-57a5b3f233f2/mzaf_13597843864119953842.plus.aac.p.m4a",
    },
];

/// The built-in deck used when the catalog returns nothing
pub fn seed_tracks() -> Vec<Track> {
    SEED_DECK
        .iter()
        .enumerate()
        .map(|(i, seed)| {
            let mut track = Track::new(format!("seed-{}", i + 1), seed.title, seed.artist)
                .with_album_art(format!("https://picsum.photos/seed/{}/600/800", seed.art))
                .with_preview(format!("{}/{}", PREVIEW_BASE, seed.preview));
            track.origin = TrackOrigin::Seed;
            track
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_seed_deck_is_playable_and_unique() {
        let tracks = seed_tracks();
        assert_eq!(tracks.len(), 10);
        assert!(tracks.iter().all(|t| t.is_playable()));
        assert!(tracks.iter().all(|t| t.origin == TrackOrigin::Seed));

        let ids: HashSet<&str> = tracks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids.len(), 10);
    }

    #[test]
    fn test_random_genre_is_a_seed_genre() {
        for _ in 0..20 {
            assert!(SEED_GENRES.contains(&random_genre()));
        }
    }
}

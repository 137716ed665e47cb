use super::song::{Song, SongError};

// (key, time_ms, duration_ms). The left hand of the B section is written
// after the melody it accompanies; `Song::new` sorts it into place.
const FUR_ELISE: [(i32, u64, u64); 132] = [
    // A section
    (76, 0, 400), (75, 400, 400), (76, 800, 400), (75, 1200, 400),
    (76, 1600, 400), (71, 2000, 400), (74, 2400, 400), (72, 2800, 400),
    (69, 3200, 800), (45, 3200, 800), (52, 3200, 800), (57, 3200, 800),
    (60, 4000, 400), (64, 4400, 400), (69, 4800, 400), (71, 5200, 800),
    (40, 5200, 800), (47, 5200, 800), (52, 5200, 800), (64, 6000, 400),
    (68, 6400, 400), (71, 6800, 400), (72, 7200, 800), (45, 7200, 800),
    (52, 7200, 800), (57, 7200, 800), (76, 8000, 400), (75, 8400, 400),
    (76, 8800, 400), (75, 9200, 400), (76, 9600, 400), (71, 10000, 400),
    (74, 10400, 400), (72, 10800, 400), (69, 11200, 800), (45, 11200, 800),
    (52, 11200, 800), (57, 11200, 800), (60, 12000, 400), (64, 12400, 400),
    (69, 12800, 400), (71, 13200, 800), (40, 13200, 800), (47, 13200, 800),
    (52, 13200, 800), (64, 14000, 400), (72, 14400, 400), (71, 14800, 400),
    (69, 15200, 800), (45, 15200, 800), (52, 15200, 800), (57, 15200, 800),
    // B section
    (71, 16000, 400), (72, 16400, 400), (74, 16800, 400), (76, 17200, 400),
    (79, 17600, 400), (77, 18000, 400), (76, 18400, 400), (74, 18800, 400),
    (43, 16000, 1600), (50, 16000, 1600), (55, 16000, 1600), (38, 17600, 1600),
    (50, 17600, 1600), (57, 17600, 1600), (77, 19200, 400), (76, 19600, 400),
    (74, 20000, 400), (72, 20400, 400), (76, 20800, 400), (74, 21200, 400),
    (72, 21600, 400), (71, 22000, 400), (41, 19200, 1600), (48, 19200, 1600),
    (53, 19200, 1600), (40, 20800, 1600), (47, 20800, 1600), (52, 20800, 1600),
    // A section again
    (76, 22400, 400), (75, 22800, 400), (76, 23200, 400), (75, 23600, 400),
    (76, 24000, 400), (71, 24400, 400), (74, 24800, 400), (72, 25200, 400),
    (69, 25600, 800), (45, 25600, 800), (52, 25600, 800), (57, 25600, 800),
    (60, 26400, 400), (64, 26800, 400), (69, 27200, 400), (71, 27600, 800),
    (40, 27600, 800), (47, 27600, 800), (52, 27600, 800), (64, 28400, 400),
    (68, 28800, 400), (71, 29200, 400), (72, 29600, 800), (45, 29600, 800),
    (52, 29600, 800), (57, 29600, 800), (76, 30400, 400), (75, 30800, 400),
    (76, 31200, 400), (75, 31600, 400), (76, 32000, 400), (71, 32400, 400),
    (74, 32800, 400), (72, 33200, 400), (69, 33600, 800), (45, 33600, 800),
    (52, 33600, 800), (57, 33600, 800), (60, 34400, 400), (64, 34800, 400),
    (69, 35200, 400), (71, 35600, 800), (40, 35600, 800), (47, 35600, 800),
    (52, 35600, 800), (64, 36400, 400), (72, 36800, 400), (71, 37200, 400),
    (69, 37600, 1200), (45, 37600, 1200), (52, 37600, 1200), (57, 37600, 1200),
];

pub fn fur_elise() -> Result<Song, SongError> {
    Song::from_score("Für Elise", &FUR_ELISE, 38, 79)
}

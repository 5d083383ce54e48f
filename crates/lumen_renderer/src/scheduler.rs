//! Row-band scheduling.
//!
//! The image splits into a fixed number of equal row bands plus one
//! residual band for the leftover rows. Bands render in parallel over
//! disjoint slices of the output buffer, and each band owns its own
//! seeded RNG, so a render is deterministic for a given scene seed
//! regardless of thread timing.

use lumen_math::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Number of equal bands the image rows split into.
pub const BAND_COUNT: u32 = 8;

/// A contiguous range of image rows, `end_row` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Band {
    pub start_row: u32,
    pub end_row: u32,
}

impl Band {
    pub fn row_count(&self) -> u32 {
        self.end_row - self.start_row
    }
}

/// Split `height` rows into `BAND_COUNT` equal bands plus a residual
/// band when the height does not divide evenly. Images shorter than
/// `BAND_COUNT` rows become a single band.
pub fn bands(height: u32) -> Vec<Band> {
    let rows_per_band = height / BAND_COUNT;
    if rows_per_band == 0 {
        if height == 0 {
            return Vec::new();
        }
        return vec![Band {
            start_row: 0,
            end_row: height,
        }];
    }

    let mut plan = Vec::with_capacity(BAND_COUNT as usize + 1);
    for i in 0..BAND_COUNT {
        plan.push(Band {
            start_row: i * rows_per_band,
            end_row: (i + 1) * rows_per_band,
        });
    }
    if height % BAND_COUNT != 0 {
        plan.push(Band {
            start_row: BAND_COUNT * rows_per_band,
            end_row: height,
        });
    }
    plan
}

/// Render every band in parallel into `pixels` (row-major, one `Vec3`
/// per pixel). `pixel` is called once per pixel with the band's RNG,
/// which is seeded from `seed` plus the band index.
pub fn render_bands<F>(pixels: &mut [Vec3], width: u32, height: u32, seed: u64, pixel: F)
where
    F: Fn(u32, u32, &mut StdRng) -> Vec3 + Sync,
{
    debug_assert_eq!(pixels.len(), (width * height) as usize);

    let plan = bands(height);
    let mut remaining = pixels;
    let pixel = &pixel;

    rayon::scope(|scope| {
        for (index, band) in plan.into_iter().enumerate() {
            let rows = band.row_count() as usize;
            let (slice, rest) =
                std::mem::take(&mut remaining).split_at_mut(rows * width as usize);
            remaining = rest;

            scope.spawn(move |_| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(index as u64));
                let mut offset = 0;
                for y in band.start_row..band.end_row {
                    for x in 0..width {
                        slice[offset] = pixel(x, y, &mut rng);
                        offset += 1;
                    }
                }
            });
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bands_cover_rows_exactly_once() {
        for height in [8, 64, 100, 257, 1080] {
            let plan = bands(height);
            let mut row = 0;
            for band in &plan {
                assert_eq!(band.start_row, row);
                assert!(band.end_row > band.start_row);
                row = band.end_row;
            }
            assert_eq!(row, height);
        }
    }

    #[test]
    fn test_equal_bands_plus_residual() {
        let plan = bands(100);
        assert_eq!(plan.len(), 9);
        for band in &plan[..8] {
            assert_eq!(band.row_count(), 12);
        }
        assert_eq!(plan[8].row_count(), 4);

        // An exact multiple has no residual band.
        assert_eq!(bands(64).len(), 8);
    }

    #[test]
    fn test_short_image_is_one_band() {
        let plan = bands(5);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0], Band { start_row: 0, end_row: 5 });
        assert!(bands(0).is_empty());
    }

    #[test]
    fn test_every_pixel_written_once() {
        let (width, height) = (7u32, 30u32);
        let mut pixels = vec![Vec3::splat(-1.0); (width * height) as usize];

        render_bands(&mut pixels, width, height, 0, |x, y, _| {
            Vec3::new(x as f32, y as f32, 0.0)
        });

        for y in 0..height {
            for x in 0..width {
                let p = pixels[(y * width + x) as usize];
                assert_eq!(p, Vec3::new(x as f32, y as f32, 0.0));
            }
        }
    }

    #[test]
    fn test_render_is_deterministic_for_a_seed() {
        use rand::Rng;

        let (width, height) = (16u32, 40u32);
        let run = |seed: u64| {
            let mut pixels = vec![Vec3::ZERO; (width * height) as usize];
            render_bands(&mut pixels, width, height, seed, |_, _, rng| {
                Vec3::splat(rng.gen::<f32>())
            });
            pixels
        };

        assert_eq!(run(42), run(42));
        assert_ne!(run(42), run(43));
    }
}

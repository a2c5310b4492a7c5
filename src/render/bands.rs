use std::any::Any;
use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::{BandFault, RenderError};
use crate::fractal::FrameParams;
use crate::render::escape_time::render_band;

/// Plage de lignes `[start, end)` confiée à un worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Band {
    pub start: usize,
    pub end: usize,
}

impl Band {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn rows(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Découpe `[0, height)` en `count` bandes contiguës.
///
/// Chaque bande reçoit `height / count` lignes, les `height % count`
/// premières en reçoivent une de plus. Avec `count > height` les
/// dernières bandes sont vides.
pub fn partition_rows(height: usize, count: usize) -> Vec<Band> {
    if count == 0 {
        return Vec::new();
    }
    let base = height / count;
    let remainder = height % count;

    let mut bands = Vec::with_capacity(count);
    let mut start = 0;
    for i in 0..count {
        let rows = base + usize::from(i < remainder);
        bands.push(Band { start, end: start + rows });
        start += rows;
    }
    bands
}

/// Répartit le rendu d'une frame en bandes horizontales, une tâche par bande,
/// sur un pool de threads réutilisé d'une frame à l'autre.
///
/// Chaque appel est bloquant : il ne rend la main qu'une fois toutes les
/// bandes terminées.
pub struct BandScheduler {
    pool: ThreadPool,
    worker_count: usize,
}

impl BandScheduler {
    pub fn new(worker_count: usize) -> Result<Self, RenderError> {
        if worker_count == 0 {
            return Err(RenderError::NoWorkers);
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(worker_count)
            .thread_name(|index| format!("mandelzoom-band-{index}"))
            .build()?;
        log::debug!("Pool de rendu: {} workers", worker_count);
        Ok(Self { pool, worker_count })
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Rend une frame complète dans `pixels`.
    pub fn render_frame(&self, params: &FrameParams, pixels: &mut [u32]) -> Result<(), RenderError> {
        let start = Instant::now();
        self.render_with(
            params.width as usize,
            params.height as usize,
            pixels,
            |band, rows| render_band(params, band, rows),
        )?;
        log::debug!(
            "Frame {}x{} (zoom {:.3}, {} itérations max) rendue en {} ms",
            params.width,
            params.height,
            params.viewport.zoom,
            params.max_iterations,
            start.elapsed().as_millis()
        );
        Ok(())
    }

    /// Exécute `kernel` sur chaque bande avec la tranche de buffer correspondante.
    ///
    /// Une panique dans une bande est capturée ; toutes les bandes sont
    /// attendues avant de renvoyer les pannes regroupées, triées par bande.
    pub fn render_with<F>(
        &self,
        width: usize,
        height: usize,
        pixels: &mut [u32],
        kernel: F,
    ) -> Result<(), RenderError>
    where
        F: Fn(Band, &mut [u32]) + Sync,
    {
        let expected = width * height;
        if pixels.len() != expected {
            return Err(RenderError::BufferSize {
                expected,
                actual: pixels.len(),
            });
        }

        // Tranches disjointes : aucun verrou sur les pixels
        let bands = partition_rows(height, self.worker_count);
        let mut slices = Vec::with_capacity(bands.len());
        let mut remaining = pixels;
        for band in bands {
            let (rows, rest) = std::mem::take(&mut remaining).split_at_mut(band.len() * width);
            slices.push((band, rows));
            remaining = rest;
        }

        let faults = Mutex::new(Vec::new());
        let kernel = &kernel;
        let faults_ref = &faults;

        self.pool.scope(|scope| {
            for (index, (band, rows)) in slices.into_iter().enumerate() {
                if band.is_empty() {
                    continue;
                }
                scope.spawn(move |_| {
                    let outcome = panic::catch_unwind(AssertUnwindSafe(|| kernel(band, rows)));
                    if let Err(payload) = outcome {
                        let fault = BandFault {
                            index,
                            band,
                            message: panic_message(payload.as_ref()),
                        };
                        log::error!("Worker en échec: {}", fault);
                        faults_ref
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .push(fault);
                    }
                });
            }
        });

        let mut faults = faults.into_inner().unwrap_or_else(PoisonError::into_inner);
        if faults.is_empty() {
            Ok(())
        } else {
            faults.sort_by_key(|fault| fault.index);
            Err(RenderError::WorkerFaults(faults))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "panic inconnu".to_string())
}

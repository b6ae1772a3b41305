//! Brute-force reference pooling.
//!
//! Walks every nominal window cell in signed coordinates and skips the
//! ones that fall outside the input. Shares no code with the
//! production kernels, so agreement between the two is meaningful.

use strata_core::{Element, PoolMethod};

/// Full description of one pooling call for the reference kernels.
#[derive(Clone, Copy, Debug)]
pub struct RefPool {
    pub width: usize,
    pub height: usize,
    pub depth: usize,
    pub window: (usize, usize),
    pub stride: (usize, usize),
    /// `(left, right, top, bottom)`.
    pub pad: (usize, usize, usize, usize),
}

impl RefPool {
    pub fn pooled_width(&self) -> usize {
        (self.width + self.pad.0 + self.pad.1 - self.window.0) / self.stride.0 + 1
    }

    pub fn pooled_height(&self) -> usize {
        (self.height + self.pad.2 + self.pad.3 - self.window.1) / self.stride.1 + 1
    }

    /// Valid in-slice offsets of window `(ox, oy)`, rows outer.
    fn cells(&self, ox: usize, oy: usize) -> Vec<usize> {
        let x0 = (ox * self.stride.0) as i64 - self.pad.0 as i64;
        let y0 = (oy * self.stride.1) as i64 - self.pad.2 as i64;
        let mut cells = Vec::new();
        for dy in 0..self.window.1 as i64 {
            for dx in 0..self.window.0 as i64 {
                let (x, y) = (x0 + dx, y0 + dy);
                if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
                    cells.push(y as usize * self.width + x as usize);
                }
            }
        }
        cells
    }
}

/// First cell strictly above every earlier one, starting from `-inf`.
/// Falls back to the first cell when nothing compares greater.
fn first_max<T: Element>(src: &[T], cells: &[usize]) -> usize {
    let mut best = cells[0];
    let mut best_value = T::neg_infinity();
    for &c in cells {
        if src[c] > best_value {
            best = c;
            best_value = src[c];
        }
    }
    best
}

/// Reference forward pooling.
pub fn pool_reference<T: Element>(data: &[T], p: &RefPool, method: PoolMethod) -> Vec<T> {
    let slice = p.width * p.height;
    let (pw, ph) = (p.pooled_width(), p.pooled_height());
    let mut out = Vec::with_capacity(pw * ph * p.depth);
    for z in 0..p.depth {
        let src = &data[z * slice..(z + 1) * slice];
        for oy in 0..ph {
            for ox in 0..pw {
                let cells = p.cells(ox, oy);
                out.push(match method {
                    PoolMethod::Max => src[first_max(src, &cells)],
                    PoolMethod::Avg => {
                        cells.iter().fold(T::zero(), |a, &c| a + src[c])
                            / T::from_count(cells.len())
                    }
                });
            }
        }
    }
    out
}

/// Reference backward pooling into a fresh zeroed gradient.
pub fn pool_backward_reference<T: Element>(
    data: &[T],
    dzdy: &[T],
    p: &RefPool,
    method: PoolMethod,
) -> Vec<T> {
    let slice = p.width * p.height;
    let (pw, ph) = (p.pooled_width(), p.pooled_height());
    let mut dzdx = vec![T::zero(); slice * p.depth];
    for z in 0..p.depth {
        let base = z * slice;
        for oy in 0..ph {
            for ox in 0..pw {
                let g = dzdy[z * pw * ph + oy * pw + ox];
                let cells = p.cells(ox, oy);
                match method {
                    PoolMethod::Max => {
                        let best = first_max(&data[base..base + slice], &cells);
                        dzdx[base + best] = dzdx[base + best] + g;
                    }
                    PoolMethod::Avg => {
                        let share = g / T::from_count(cells.len());
                        for c in cells {
                            dzdx[base + c] = dzdx[base + c] + share;
                        }
                    }
                }
            }
        }
    }
    dzdx
}

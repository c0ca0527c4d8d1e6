//! Row-wise processing of images, in parallel when the `parallel` feature is enabled.
use grayedit_texel::{PixelBuffer, Rgba};

/// Call `f` for every row of `buffer` with the row index.
///
/// Rows are independent, the order of the calls is unspecified.
pub(crate) fn for_each_row<F>(buffer: &mut PixelBuffer, f: F)
where
    F: Fn(u32, &mut [Rgba]) + Sync + Send,
{
    let width = buffer.width() as usize;
    for_each_chunk(buffer.as_texels_mut(), width, f);
}

/// Call `f` for every `width` long row of a row-major image.
pub(crate) fn for_each_chunk<T, F>(data: &mut [T], width: usize, f: F)
where
    T: Send,
    F: Fn(u32, &mut [T]) + Sync + Send,
{
    if data.is_empty() || width == 0 {
        return;
    }

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        data.par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| f(y as u32, row));
    }

    #[cfg(not(feature = "parallel"))]
    {
        data.chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| f(y as u32, row));
    }
}

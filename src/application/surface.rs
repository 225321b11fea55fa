use crate::domain::chart::SurfaceOptions;
use crate::domain::errors::AppError;
use crate::domain::market_data::{Candle, UpsertOutcome};

/// A rendering surface holding a single candlestick series.
pub trait ChartSurface {
    /// Upsert a bar into the series and redraw.
    ///
    /// `ValidationError` means the bar was refused and nothing changed;
    /// `RenderingError` means the surface itself is broken.
    fn update(&mut self, candle: Candle) -> Result<UpsertOutcome, AppError>;

    /// Scale the time axis so every bar in the series is visible.
    fn fit_content(&mut self);

    fn candle_count(&self) -> usize;

    /// Release the surface. Must be safe to call twice.
    fn dispose(&mut self);
}

pub trait SurfaceFactory {
    type Surface: ChartSurface;

    fn create(&self, options: &SurfaceOptions) -> Result<Self::Surface, AppError>;
}

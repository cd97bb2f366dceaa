use anyhow::Context;
use broadspec_core::{EnergyUnit, Spectrum};
use plotters::prelude::*;
use std::path::Path;

const PLOT_SIZE: (u32, u32) = (1024, 768);

pub(super) const fn x_axis_label(unit: EnergyUnit) -> &'static str {
    match unit {
        EnergyUnit::Ev => "Energy [eV]",
        EnergyUnit::Nm => "Wavelength [nm]",
    }
}

pub(super) const Y_AXIS_LABEL: &str = "Intensity [a.u.]";

pub(super) fn plot_title(spectrum: &Spectrum) -> String {
    let sigma = spectrum.sigma();
    match (spectrum.peak(), spectrum.display_unit()) {
        (Some(peak), EnergyUnit::Ev) => {
            format!("σ = {sigma}, max energy = {:.2} eV", peak.position)
        }
        (Some(peak), EnergyUnit::Nm) => {
            format!("σ = {sigma}, lambda max = {:.1} nm", peak.position)
        }
        (None, _) => format!("σ = {sigma}"),
    }
}

/// Rounds up on a base-10 log scale: `ceil(v)` once `v <= 10`, carrying the
/// factors of ten back. Non-positive input gives 1.
pub(super) fn nice_upper_bound(value: f64) -> f64 {
    if !value.is_finite() || value <= 0.0 {
        return 1.0;
    }

    let mut scaled = value;
    let mut magnitude = 1.0;
    while scaled > 10.0 {
        scaled /= 10.0;
        magnitude *= 10.0;
    }
    scaled.ceil() * magnitude
}

pub(super) fn render_spectrum_svg(spectrum: &Spectrum, output_path: &Path) -> anyhow::Result<()> {
    let axis = spectrum.axis();
    let (Some(x_min), Some(x_max)) = (axis.first(), axis.last()) else {
        anyhow::bail!("cannot plot a spectrum without sample points");
    };
    let x_max = if x_max > x_min { x_max } else { x_min + 1.0 };
    let peak_intensity = spectrum.peak().map_or(0.0, |peak| peak.intensity);
    let y_max = nice_upper_bound(peak_intensity);

    let root = SVGBackend::new(output_path, PLOT_SIZE).into_drawing_area();
    root.fill(&WHITE).context("failed to clear plot background")?;

    let mut chart = ChartBuilder::on(&root)
        .caption(plot_title(spectrum), ("sans-serif", 30.0).into_font())
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x_min..x_max, 0.0..y_max)
        .context("failed to lay out plot")?;

    chart
        .configure_mesh()
        .x_desc(x_axis_label(spectrum.display_unit()))
        .y_desc(Y_AXIS_LABEL)
        .draw()
        .context("failed to draw plot axes")?;

    chart
        .draw_series(LineSeries::new(
            axis.points()
                .iter()
                .copied()
                .zip(spectrum.intensities().iter().copied()),
            BLUE.stroke_width(2),
        ))
        .context("failed to draw spectrum")?;

    root.present()
        .with_context(|| format!("failed to write plot '{}'", output_path.display()))?;
    Ok(())
}

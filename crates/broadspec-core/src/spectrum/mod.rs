//! Dataset-level spectrum computation with a per-unit cache.
//!
//! Every row of the dataset is broadened on the same axis with the kernel
//! that matches the requested unit (line positions are converted first when
//! the dataset was read in the other unit) and the per-row curves are
//! averaged elementwise.

use crate::common::constants::DEFAULT_SIGMA;
use crate::dataset::Dataset;
use crate::domain::{EnergyUnit, SamplingAxis, Spectrum, SpectrumError, SpectrumResult};
use crate::numerics::{BroadeningInput, BroadeningKernel};
use std::collections::BTreeMap;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumRequest {
    pub unit: EnergyUnit,
    /// Falls back to [`SamplingAxis::default_for`] the requested unit.
    pub axis: Option<SamplingAxis>,
    /// `Some` overrides the sticky sigma; `None` keeps it.
    pub sigma: Option<f64>,
}

impl SpectrumRequest {
    pub fn new(unit: EnergyUnit) -> Self {
        Self {
            unit,
            axis: None,
            sigma: None,
        }
    }

    pub fn with_axis(mut self, axis: SamplingAxis) -> Self {
        self.axis = Some(axis);
        self
    }

    pub fn with_sigma(mut self, sigma: f64) -> Self {
        self.sigma = Some(sigma);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BroadeningState {
    sigma: Option<f64>,
    cached: BTreeMap<EnergyUnit, Spectrum>,
}

impl BroadeningState {
    pub const fn sigma(&self) -> Option<f64> {
        self.sigma
    }

    pub fn cached(&self, unit: EnergyUnit) -> Option<&Spectrum> {
        self.cached.get(&unit)
    }

    pub fn cached_units(&self) -> Vec<EnergyUnit> {
        self.cached.keys().copied().collect()
    }
}

/// Outcome of a computation request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Computed<'a> {
    Fresh(&'a Spectrum),
    Cached(&'a Spectrum),
}

impl<'a> Computed<'a> {
    pub const fn spectrum(self) -> &'a Spectrum {
        match self {
            Self::Fresh(spectrum) | Self::Cached(spectrum) => spectrum,
        }
    }

    pub const fn is_fresh(self) -> bool {
        matches!(self, Self::Fresh(_))
    }
}

#[derive(Debug, Clone)]
pub struct SpectrumAggregator {
    dataset: Dataset,
    state: BroadeningState,
}

impl SpectrumAggregator {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            dataset,
            state: BroadeningState::default(),
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn state(&self) -> &BroadeningState {
        &self.state
    }

    pub const fn sigma(&self) -> Option<f64> {
        self.state.sigma
    }

    /// Replaces the sticky sigma. Cached spectra are kept; a later request
    /// for their unit recomputes them because their sigma no longer matches.
    pub fn set_sigma(&mut self, sigma: f64) -> SpectrumResult<()> {
        self.state.sigma = Some(validate_sigma(sigma)?);
        Ok(())
    }

    /// The resolved sigma becomes sticky only when the request succeeds.
    pub fn compute_spectrum(&mut self, request: SpectrumRequest) -> SpectrumResult<Computed<'_>> {
        let SpectrumRequest { unit, axis, sigma } = request;
        let sigma = self.resolve_sigma(sigma)?;
        let axis = axis.unwrap_or_else(|| SamplingAxis::default_for(unit));
        if axis.unit() != unit {
            return Err(SpectrumError::invalid_axis(format!(
                "axis is sampled in {} but the spectrum was requested in {unit}",
                axis.unit()
            )));
        }

        let cache_hit = self
            .state
            .cached
            .get(&unit)
            .is_some_and(|cached| cached.sigma() == sigma && cached.axis() == &axis);
        if cache_hit {
            self.state.sigma = Some(sigma);
            debug!("reusing cached spectrum in {unit} (sigma = {sigma})");
            return Ok(Computed::Cached(&self.state.cached[&unit]));
        }

        info!("Calculating spectrum in {unit} (sigma = {sigma})");
        let intensities = self.average_rows(unit, sigma, &axis)?;
        let spectrum = Spectrum::from_parts(axis, intensities, sigma, self.dataset.unit());

        self.state.sigma = Some(sigma);
        self.state.cached.insert(unit, spectrum);
        Ok(Computed::Fresh(&self.state.cached[&unit]))
    }

    /// Read access to the cache. Without a unit the single cached spectrum is
    /// returned; none or both cached are errors.
    pub fn spectrum(&self, unit: Option<EnergyUnit>) -> SpectrumResult<&Spectrum> {
        match unit {
            Some(unit) => self
                .state
                .cached
                .get(&unit)
                .ok_or(SpectrumError::UncomputedSpectrum { unit: Some(unit) }),
            None => {
                let mut cached = self.state.cached.values();
                match (cached.next(), cached.next()) {
                    (Some(spectrum), None) => Ok(spectrum),
                    (Some(_), Some(_)) => Err(SpectrumError::AmbiguousUnit),
                    (None, _) => Err(SpectrumError::UncomputedSpectrum { unit: None }),
                }
            }
        }
    }

    /// Spectrum to present. An explicit `sigma` overrides the sticky one. An
    /// explicit `unit` is computed on demand; without one the cache must hold
    /// exactly one spectrum. Stale entries are recomputed on their own axis.
    pub fn display_spectrum(
        &mut self,
        unit: Option<EnergyUnit>,
        sigma: Option<f64>,
    ) -> SpectrumResult<Computed<'_>> {
        let unit = match unit {
            Some(unit) => unit,
            None => self.spectrum(None)?.display_unit(),
        };
        let axis = self
            .state
            .cached
            .get(&unit)
            .map(|cached| cached.axis().clone());

        self.compute_spectrum(SpectrumRequest { unit, axis, sigma })
    }

    fn resolve_sigma(&self, requested: Option<f64>) -> SpectrumResult<f64> {
        match requested {
            Some(sigma) => validate_sigma(sigma),
            None => Ok(self.state.sigma.unwrap_or(DEFAULT_SIGMA)),
        }
    }

    fn average_rows(
        &self,
        unit: EnergyUnit,
        sigma: f64,
        axis: &SamplingAxis,
    ) -> SpectrumResult<Vec<f64>> {
        let kernel = BroadeningKernel::for_unit(unit);
        let source_unit = self.dataset.unit();
        let mut total = vec![0.0; axis.len()];

        for lines in self.dataset.rows() {
            let lines = lines.converted(source_unit, unit)?;
            let positions = lines.positions();
            let strengths = lines.strengths();
            let curve = kernel.broaden(BroadeningInput::new(
                &positions,
                &strengths,
                sigma,
                axis.points(),
            ))?;
            for (accumulated, value) in total.iter_mut().zip(curve) {
                *accumulated += value;
            }
        }

        let row_count = self.dataset.len() as f64;
        for value in &mut total {
            *value /= row_count;
        }
        Ok(total)
    }
}

fn validate_sigma(sigma: f64) -> SpectrumResult<f64> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(SpectrumError::InvalidSigma { value: sigma });
    }
    Ok(sigma)
}

#[cfg(test)]
mod tests {
    use super::{Computed, SpectrumAggregator, SpectrumRequest};
    use crate::dataset::Dataset;
    use crate::domain::{EnergyUnit, LineSet, SamplingAxis, SpectrumError};
    use crate::numerics::{BroadeningInput, broaden_energy, broaden_wavelength};

    fn energy_rows() -> Vec<LineSet> {
        vec![
            LineSet::from_columns(&[2.0, 3.1], &[0.5, 1.2]).expect("row"),
            LineSet::from_columns(&[2.2, 3.0], &[0.4, 1.0]).expect("row"),
        ]
    }

    fn aggregator() -> SpectrumAggregator {
        SpectrumAggregator::new(Dataset::from_rows(energy_rows()).expect("dataset"))
    }

    #[test]
    fn identical_rows_average_to_the_single_row_curve() {
        let row = LineSet::from_columns(&[2.4, 3.3], &[0.8, 0.1]).expect("row");
        let dataset = Dataset::from_rows(vec![row.clone(), row.clone()]).expect("dataset");
        let mut aggregator = SpectrumAggregator::new(dataset);

        let computed = aggregator
            .compute_spectrum(SpectrumRequest::new(EnergyUnit::Ev))
            .expect("spectrum");
        let axis = SamplingAxis::default_for(EnergyUnit::Ev);
        let single = broaden_energy(BroadeningInput::new(
            &row.positions(),
            &row.strengths(),
            0.2,
            axis.points(),
        ))
        .expect("single row");

        assert!(computed.is_fresh());
        assert_eq!(computed.spectrum().intensities(), single.as_slice());
    }

    #[test]
    fn rows_are_averaged_elementwise() {
        let mut aggregator = aggregator();
        let axis = SamplingAxis::new(vec![2.0, 2.5, 3.0], EnergyUnit::Ev).expect("axis");
        let spectrum = aggregator
            .compute_spectrum(SpectrumRequest::new(EnergyUnit::Ev).with_axis(axis.clone()))
            .expect("spectrum")
            .spectrum()
            .clone();

        let rows = energy_rows();
        let first = broaden_energy(BroadeningInput::new(
            &rows[0].positions(),
            &rows[0].strengths(),
            0.2,
            axis.points(),
        ))
        .expect("row 0");
        let second = broaden_energy(BroadeningInput::new(
            &rows[1].positions(),
            &rows[1].strengths(),
            0.2,
            axis.points(),
        ))
        .expect("row 1");

        for index in 0..axis.len() {
            let expected = (first[index] + second[index]) / 2.0;
            assert!((spectrum.intensities()[index] - expected).abs() < 1.0e-15);
        }
        assert_eq!(spectrum.source_unit(), EnergyUnit::Ev);
        assert_eq!(spectrum.display_unit(), EnergyUnit::Ev);
    }

    #[test]
    fn nm_requests_convert_positions_and_use_wavelength_kernel() {
        let mut aggregator = aggregator();
        let axis = SamplingAxis::linspace(300.0, 700.0, 41, EnergyUnit::Nm).expect("axis");
        let spectrum = aggregator
            .compute_spectrum(SpectrumRequest::new(EnergyUnit::Nm).with_axis(axis.clone()))
            .expect("spectrum")
            .spectrum()
            .clone();

        let mut expected = vec![0.0; axis.len()];
        for row in energy_rows() {
            let converted = row
                .converted(EnergyUnit::Ev, EnergyUnit::Nm)
                .expect("conversion");
            let curve = broaden_wavelength(BroadeningInput::new(
                &converted.positions(),
                &converted.strengths(),
                0.2,
                axis.points(),
            ))
            .expect("curve");
            for (total, value) in expected.iter_mut().zip(curve) {
                *total += value / 2.0;
            }
        }

        for (actual, expected) in spectrum.intensities().iter().zip(&expected) {
            assert!(((actual - expected) / expected.max(1.0)).abs() < 1.0e-12);
        }
        assert_eq!(spectrum.source_unit(), EnergyUnit::Ev);
        assert_eq!(spectrum.display_unit(), EnergyUnit::Nm);
    }

    #[test]
    fn peak_is_localized_within_one_sample_spacing() {
        let row = LineSet::from_columns(&[3.0], &[5.0]).expect("row");
        let mut aggregator = SpectrumAggregator::new(Dataset::from_rows(vec![row]).expect("ds"));
        let axis = SamplingAxis::linspace(1.0, 5.0, 1000, EnergyUnit::Ev).expect("axis");
        let spacing = axis.points()[1] - axis.points()[0];

        let computed = aggregator
            .compute_spectrum(
                SpectrumRequest::new(EnergyUnit::Ev)
                    .with_axis(axis)
                    .with_sigma(0.1),
            )
            .expect("spectrum");
        let peak = computed.spectrum().peak().expect("peak");

        assert!((peak.position - 3.0).abs() <= spacing);
        assert!(peak.intensity <= 5.0 && peak.intensity > 4.9);
    }

    #[test]
    fn repeated_request_hits_the_cache() {
        let mut aggregator = aggregator();
        let first = aggregator
            .compute_spectrum(SpectrumRequest::new(EnergyUnit::Ev))
            .expect("first")
            .is_fresh();
        let second = aggregator
            .compute_spectrum(SpectrumRequest::new(EnergyUnit::Ev))
            .expect("second");

        assert!(first);
        assert!(matches!(second, Computed::Cached(_)));
    }

    #[test]
    fn sigma_is_sticky_until_overridden() {
        let mut aggregator = aggregator();
        aggregator
            .compute_spectrum(SpectrumRequest::new(EnergyUnit::Ev).with_sigma(0.3))
            .expect("eV");
        assert_eq!(aggregator.sigma(), Some(0.3));

        let nm = aggregator
            .compute_spectrum(SpectrumRequest::new(EnergyUnit::Nm))
            .expect("nm");
        assert_eq!(nm.spectrum().sigma(), 0.3);

        let overridden = aggregator
            .compute_spectrum(SpectrumRequest::new(EnergyUnit::Nm).with_sigma(0.1))
            .expect("override");
        assert!(overridden.is_fresh());
        assert_eq!(overridden.spectrum().sigma(), 0.1);

        let ev = aggregator.spectrum(Some(EnergyUnit::Ev)).expect("eV stays cached");
        assert_eq!(ev.sigma(), 0.3);
    }

    #[test]
    fn default_sigma_becomes_sticky() {
        let mut aggregator = aggregator();
        assert_eq!(aggregator.sigma(), None);
        aggregator
            .compute_spectrum(SpectrumRequest::new(EnergyUnit::Ev))
            .expect("spectrum");
        assert_eq!(aggregator.sigma(), Some(0.2));
    }

    #[test]
    fn invalid_sigma_and_mismatched_axis_are_rejected() {
        let mut aggregator = aggregator();
        let error = aggregator
            .compute_spectrum(SpectrumRequest::new(EnergyUnit::Ev).with_sigma(0.0))
            .expect_err("zero sigma");
        assert_eq!(error, SpectrumError::InvalidSigma { value: 0.0 });
        assert_eq!(aggregator.sigma(), None);

        let error = aggregator
            .compute_spectrum(
                SpectrumRequest::new(EnergyUnit::Ev)
                    .with_axis(SamplingAxis::default_for(EnergyUnit::Nm)),
            )
            .expect_err("axis unit mismatch");
        assert!(matches!(error, SpectrumError::InvalidAxis { .. }));
    }

    #[test]
    fn failed_requests_leave_sigma_and_cache_unchanged() {
        let mut aggregator = aggregator();
        let error = aggregator
            .compute_spectrum(
                SpectrumRequest::new(EnergyUnit::Ev)
                    .with_sigma(0.7)
                    .with_axis(SamplingAxis::default_for(EnergyUnit::Nm)),
            )
            .expect_err("axis unit mismatch");
        assert!(matches!(error, SpectrumError::InvalidAxis { .. }));
        assert_eq!(aggregator.sigma(), None);

        aggregator
            .compute_spectrum(SpectrumRequest::new(EnergyUnit::Ev).with_sigma(0.3))
            .expect("eV");
        aggregator
            .compute_spectrum(
                SpectrumRequest::new(EnergyUnit::Nm)
                    .with_sigma(0.7)
                    .with_axis(SamplingAxis::default_for(EnergyUnit::Ev)),
            )
            .expect_err("axis unit mismatch");
        assert_eq!(aggregator.sigma(), Some(0.3));
        assert_eq!(aggregator.state().cached_units(), vec![EnergyUnit::Ev]);

        aggregator
            .compute_spectrum(SpectrumRequest::new(EnergyUnit::Nm))
            .expect("nm");
        aggregator
            .display_spectrum(None, Some(0.9))
            .expect_err("both units cached");
        assert_eq!(aggregator.sigma(), Some(0.3));
    }

    #[test]
    fn reading_before_calculation_is_uncomputed() {
        let aggregator = aggregator();
        assert_eq!(
            aggregator.spectrum(None),
            Err(SpectrumError::UncomputedSpectrum { unit: None })
        );
        assert_eq!(
            aggregator.spectrum(Some(EnergyUnit::Nm)),
            Err(SpectrumError::UncomputedSpectrum {
                unit: Some(EnergyUnit::Nm)
            })
        );
    }

    #[test]
    fn both_units_cached_without_selection_is_ambiguous() {
        let mut aggregator = aggregator();
        aggregator
            .compute_spectrum(SpectrumRequest::new(EnergyUnit::Ev))
            .expect("eV");
        assert_eq!(
            aggregator.spectrum(None).expect("single").display_unit(),
            EnergyUnit::Ev
        );

        aggregator
            .compute_spectrum(SpectrumRequest::new(EnergyUnit::Nm))
            .expect("nm");
        assert_eq!(aggregator.spectrum(None), Err(SpectrumError::AmbiguousUnit));
        assert_eq!(
            aggregator
                .display_spectrum(None, None)
                .expect_err("ambiguous display"),
            SpectrumError::AmbiguousUnit
        );
        assert_eq!(
            aggregator.state().cached_units(),
            vec![EnergyUnit::Ev, EnergyUnit::Nm]
        );
    }

    #[test]
    fn display_computes_on_demand_and_refreshes_stale_sigma() {
        let mut aggregator = aggregator();
        assert_eq!(
            aggregator.display_spectrum(None, None),
            Err(SpectrumError::UncomputedSpectrum { unit: None })
        );

        let on_demand = aggregator
            .display_spectrum(Some(EnergyUnit::Nm), None)
            .expect("on demand");
        assert!(on_demand.is_fresh());
        assert_eq!(on_demand.spectrum().len(), 1000);

        let custom_axis = SamplingAxis::linspace(1.5, 4.5, 31, EnergyUnit::Ev).expect("axis");
        aggregator
            .compute_spectrum(SpectrumRequest::new(EnergyUnit::Ev).with_axis(custom_axis))
            .expect("eV");

        let cached = aggregator
            .display_spectrum(Some(EnergyUnit::Ev), None)
            .expect("cached");
        assert!(!cached.is_fresh());

        let refreshed = aggregator
            .display_spectrum(Some(EnergyUnit::Ev), Some(0.5))
            .expect("refreshed");
        assert!(refreshed.is_fresh());
        assert_eq!(refreshed.spectrum().sigma(), 0.5);
        assert_eq!(refreshed.spectrum().len(), 31);
    }
}

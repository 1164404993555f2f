use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use nalgebra::Vector3;
use serde::Serialize;

use crate::propagation::{
    circular_orbit, Attractor, AttractorSnapshot, BodyParams, BodyState, OrbitDiagnostics,
    Propagator, PropagatorConfig, EARTH_MASS_KG, EARTH_RADIUS_KM, KM_PER_UNIT,
};
use crate::scenario::Scenario;

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Scenario JSON file
    #[arg(long)]
    pub scenario: PathBuf,
    /// Output JSON file path
    #[arg(long, default_value = "out/scenario_report.json")]
    pub output: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct ValidateOrbitArgs {
    /// Circular orbit altitude in kilometers
    #[arg(long, default_value_t = 407.0)]
    pub altitude_km: f64,
    /// Number of orbital periods to propagate
    #[arg(long, default_value_t = 1)]
    pub orbits: u32,
    /// Maximum substep in seconds
    #[arg(long, default_value_t = 0.002)]
    pub substep: f64,
    /// Frame length in seconds
    #[arg(long, default_value_t = 1.0)]
    pub frame_dt: f64,
    /// Output JSON file path
    #[arg(long, default_value = "out/orbit_validation.json")]
    pub output: PathBuf,
}

#[derive(Debug, Serialize)]
struct StateSample {
    frame: usize,
    time_s: f64,
    position_km: Vector3<f64>,
    velocity_km_s: Vector3<f64>,
    altitude_km: Option<f64>,
    diagnostics: Option<OrbitDiagnostics>,
}

#[derive(Debug, Serialize)]
struct ScenarioReport {
    generated_at: String,
    scenario: PathBuf,
    integrator: &'static str,
    frame_dt: f64,
    frames: usize,
    substeps_per_frame: usize,
    non_finite_frame: Option<usize>,
    samples: Vec<StateSample>,
}

#[derive(Debug, Serialize, Clone)]
struct OrbitRecord {
    orbit: u32,
    radius_error: f64,
    eccentricity: f64,
    apoapsis_km: f64,
    periapsis_km: f64,
    apoapsis_drift: f64,
    periapsis_drift: f64,
    energy_error: f64,
    angular_momentum_error: f64,
}

#[derive(Debug, Serialize)]
struct ValidationReport {
    generated_at: String,
    altitude_km: f64,
    radius_km: f64,
    period_s: f64,
    max_substep_dt: f64,
    frame_dt: f64,
    orbits: Vec<OrbitRecord>,
}

fn sample(
    frame: usize,
    frame_dt: f64,
    state: &BodyState,
    primary: Option<&Attractor>,
    reference_radius_km: f64,
) -> StateSample {
    let diagnostics = primary.map(|a| OrbitDiagnostics::relative_to(state, a));
    StateSample {
        frame,
        time_s: frame as f64 * frame_dt,
        position_km: state.position_km(),
        velocity_km_s: state.velocity_km_s(),
        altitude_km: diagnostics.map(|d| d.radius * KM_PER_UNIT - reference_radius_km),
        diagnostics,
    }
}

fn write_report<T: Serialize>(path: &Path, report: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create report file: {:?}", path))?;
    serde_json::to_writer_pretty(file, report)?;
    Ok(())
}

fn progress_bar(len: u64) -> Result<ProgressBar> {
    let progress = ProgressBar::new(len);
    progress.set_style(
        ProgressStyle::with_template(
            "{elapsed_precise} {bar:40.cyan/blue} {pos}/{len} {percent}% ETA {eta_precise}",
        )?
        .progress_chars("##-"),
    );
    Ok(progress)
}

pub fn run_scenario(args: RunArgs) -> Result<()> {
    let scenario = Scenario::load(&args.scenario)?;
    let propagator = scenario.propagator()?;
    let primary = scenario.primary_attractor();
    let reference_radius_km = scenario.config.drag.reference_radius_km;
    let (substeps_per_frame, _) = propagator.substep_plan(scenario.frame_dt);

    log::info!(
        "Propagating with {} ({} substeps per frame)...",
        propagator.integrator().name(),
        substeps_per_frame
    );

    let mut samples = vec![sample(
        0,
        scenario.frame_dt,
        &scenario.initial_state(),
        primary.as_ref(),
        reference_radius_km,
    )];
    let mut non_finite_frame = None;

    let progress = progress_bar(scenario.frames as u64)?;
    scenario.simulate(&propagator, |frame, state| {
        if non_finite_frame.is_none() && !state.is_finite() {
            log::warn!("Non-finite state at frame {}", frame);
            non_finite_frame = Some(frame);
        }
        if frame % scenario.sample_every == 0 || frame == scenario.frames {
            samples.push(sample(
                frame,
                scenario.frame_dt,
                state,
                primary.as_ref(),
                reference_radius_km,
            ));
        }
        progress.inc(1);
    })?;
    progress.finish_and_clear();

    let report = ScenarioReport {
        generated_at: chrono::Utc::now().to_rfc3339(),
        scenario: args.scenario.clone(),
        integrator: propagator.integrator().name(),
        frame_dt: scenario.frame_dt,
        frames: scenario.frames,
        substeps_per_frame,
        non_finite_frame,
        samples,
    };
    write_report(&args.output, &report)?;

    log::info!("Wrote scenario report to {:?}", args.output);
    Ok(())
}

pub fn validate_orbit(args: ValidateOrbitArgs) -> Result<()> {
    if args.altitude_km <= 0.0 {
        return Err(anyhow!("altitude-km must be > 0"));
    }
    if !(args.frame_dt.is_finite() && args.frame_dt > 0.0) {
        return Err(anyhow!("frame-dt must be > 0"));
    }
    if args.orbits == 0 {
        return Err(anyhow!("orbits must be > 0"));
    }

    let config = PropagatorConfig::vacuum().with_max_substep(args.substep);
    let propagator = Propagator::new(config).context("Invalid substep")?;

    let earth = Attractor::new(Vector3::zeros(), EARTH_MASS_KG);
    let snapshot = AttractorSnapshot::central_body(earth);
    let params = BodyParams::new(1000.0, 0.0, 0.0);

    let radius = (EARTH_RADIUS_KM + args.altitude_km) / KM_PER_UNIT;
    let initial = circular_orbit(&earth, radius);
    let initial_diag = OrbitDiagnostics::relative_to(&initial, &earth);
    let period = initial_diag
        .period(&earth)
        .ok_or_else(|| anyhow!("initial orbit is not bound"))?;

    log::info!(
        "Validating {} orbit(s) at {} km (period {:.1} s, substep {} s)...",
        args.orbits,
        args.altitude_km,
        period,
        args.substep
    );

    let progress = progress_bar(args.orbits as u64)?;
    let mut state = initial;
    let mut previous = initial_diag;
    let mut orbits = Vec::with_capacity(args.orbits as usize);

    for orbit in 1..=args.orbits {
        state = propagator.propagate_duration(
            &state,
            &params,
            &snapshot,
            Vector3::zeros(),
            period,
            args.frame_dt,
        );
        if !state.is_finite() {
            log::warn!("Non-finite state after orbit {}", orbit);
            break;
        }

        let diag = OrbitDiagnostics::relative_to(&state, &earth);
        let record = OrbitRecord {
            orbit,
            radius_error: (diag.radius - radius).abs() / radius,
            eccentricity: diag.eccentricity,
            apoapsis_km: diag.apoapsis() * KM_PER_UNIT,
            periapsis_km: diag.periapsis() * KM_PER_UNIT,
            apoapsis_drift: (diag.apoapsis() - previous.apoapsis()).abs() / previous.apoapsis(),
            periapsis_drift: (diag.periapsis() - previous.periapsis()).abs()
                / previous.periapsis(),
            energy_error: ((diag.specific_energy - initial_diag.specific_energy)
                / initial_diag.specific_energy)
                .abs(),
            angular_momentum_error: (diag.angular_momentum - initial_diag.angular_momentum)
                .norm()
                / initial_diag.angular_momentum.norm(),
        };

        log::info!(
            "Orbit {}: radius error {:.3e}, e = {:.3e}, apo drift {:.3e}, peri drift {:.3e}",
            orbit,
            record.radius_error,
            record.eccentricity,
            record.apoapsis_drift,
            record.periapsis_drift
        );

        orbits.push(record);
        previous = diag;
        progress.inc(1);
    }
    progress.finish_and_clear();

    let report = ValidationReport {
        generated_at: chrono::Utc::now().to_rfc3339(),
        altitude_km: args.altitude_km,
        radius_km: radius * KM_PER_UNIT,
        period_s: period,
        max_substep_dt: args.substep,
        frame_dt: args.frame_dt,
        orbits,
    };
    write_report(&args.output, &report)?;

    log::info!("Wrote orbit validation to {:?}", args.output);
    Ok(())
}

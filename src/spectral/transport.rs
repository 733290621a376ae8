//! One-dimensional optimal transport between spectral frames.
//!
//! Both frames are treated as mass distributions over the frequency axis.
//! Since the points are sorted, the optimal plan aligns the cumulative mass
//! functions: walking both frames in frequency order, every cumulative boundary
//! of one frame that falls inside a point of the other splits that point, which
//! yields a common refinement where each piece is moved monotonically. Mass
//! present on only one side (the tail of the heavier frame) fades out or
//! emerges in place.
//!
//! The carried frame only moves part of the way toward the analyzed frame on
//! each step (`decay`), producing a continuous glide across the whole signal.
//!
//! Matched points are phase-locked to the analyzed point they move toward: the
//! accumulator of a slot holds the phase its glided frequency has gained over
//! that analyzed frequency, so each point advances at the instantaneous
//! frequency measured by the analysis plus its detuning. Fading points have no
//! analyzed counterpart and advance by `2π * frequency * hop`.

use std::cmp::Ordering;
use std::f64::consts::{PI, TAU};

use super::frame::{Frame, SpectralPoint};
use crate::error::{MorphError, Result};

/// Frequencies below this are treated as this value when measuring glide distance.
const LOW_FREQUENCY_FLOOR: f64 = 20.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransportOptions {
    /// Matched pieces spanning more octaves than this cross-fade instead of gliding.
    pub max_glide_octaves: f64,
    /// Output points closer than this (Hz) to the first point of their group are merged.
    pub merge_width_hz: f64,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            max_glide_octaves: 0.5,
            merge_width_hz: 0.0,
        }
    }
}

/// One piece of the transport plan.
///
/// `from` indexes the previous frame and `to` the current one. A missing
/// index marks one-sided mass: fading out (`to == None`) or emerging
/// (`from == None`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transfer {
    pub from: Option<usize>,
    pub to: Option<usize>,
    pub mass: f64,
}

impl Transfer {
    fn matched(from: usize, to: usize, mass: f64) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
            mass,
        }
    }

    fn fading(from: usize, mass: f64) -> Self {
        Self {
            from: Some(from),
            to: None,
            mass,
        }
    }

    fn emerging(to: usize, mass: f64) -> Self {
        Self {
            from: None,
            to: Some(to),
            mass,
        }
    }

    pub fn is_matched(&self) -> bool {
        self.from.is_some() && self.to.is_some()
    }
}

fn octave_distance(a: f64, b: f64) -> f64 {
    (a.max(LOW_FREQUENCY_FLOOR) / b.max(LOW_FREQUENCY_FLOOR))
        .log2()
        .abs()
}

/// Running mass totals, `len + 1` entries starting at 0.
fn cumulative_mass(frame: &Frame) -> Vec<f64> {
    let mut total = 0.0;
    let mut cumulative = Vec::with_capacity(frame.len() + 1);
    cumulative.push(0.0);
    for point in &frame.points {
        total += point.amplitude;
        cumulative.push(total);
    }
    cumulative
}

/// Monotone, mass-conserving transport plan from `prev` to `cur`.
///
/// Matched masses sum to `min(mA, mB)`; the remaining `|mA - mB|` of the
/// heavier frame is one-sided. Every point's pieces sum to its amplitude.
/// Zero-mass points still appear as zero-mass pieces.
pub fn transport_plan(prev: &Frame, cur: &Frame) -> Vec<Transfer> {
    let cum_prev = cumulative_mass(prev);
    let cum_cur = cumulative_mass(cur);
    let mut plan = Vec::with_capacity(prev.len() + cur.len());

    let (mut i, mut j) = (0, 0);
    let mut position = 0.0;
    while i < prev.len() && j < cur.len() {
        let (a, b) = (cum_prev[i + 1], cum_cur[j + 1]);
        let boundary = a.min(b);
        plan.push(Transfer::matched(i, j, (boundary - position).max(0.0)));
        position = boundary;
        // Every iteration consumes at least one point, even on NaN.
        match a.partial_cmp(&b) {
            Some(Ordering::Less) => i += 1,
            Some(Ordering::Greater) => j += 1,
            _ => {
                i += 1;
                j += 1;
            }
        }
    }

    for k in i..prev.len() {
        let share = (cum_prev[k + 1] - position.max(cum_prev[k])).max(0.0);
        plan.push(Transfer::fading(k, share));
    }
    for k in j..cur.len() {
        let share = (cum_cur[k + 1] - position.max(cum_cur[k])).max(0.0);
        plan.push(Transfer::emerging(k, share));
    }

    plan
}

/// Wrap a phase into [-π, π). Non-finite input restarts at zero.
pub fn wrap_phase(phase: f64) -> f64 {
    if !phase.is_finite() {
        return 0.0;
    }
    (phase + PI).rem_euclid(TAU) - PI
}

pub(crate) fn validate_decay(decay: f64) -> Result<()> {
    if decay > 0.0 && decay <= 1.0 {
        Ok(())
    } else {
        Err(MorphError::InvalidDecay(decay))
    }
}

fn validate_frame(frame: &Frame, which: &'static str) -> Result<()> {
    if frame.is_empty() || !frame.mass().is_finite() {
        return Err(MorphError::DegenerateFrame { which });
    }
    Ok(())
}

/// Glide `prev` toward `cur` with the default [`TransportOptions`].
pub fn interpolate(
    prev: &Frame,
    cur: &Frame,
    phases: &mut Vec<f64>,
    window_seconds: f64,
    decay: f64,
) -> Result<Frame> {
    interpolate_with(
        prev,
        cur,
        phases,
        window_seconds,
        decay,
        &TransportOptions::default(),
    )
}

/// A glided point together with its phase offset from the analysis.
#[derive(Clone, Copy, Debug)]
struct Glided {
    point: SpectralPoint,
    offset: f64,
}

/// Advance the carried frame `prev` a `1 - decay` fraction of the way toward
/// the analyzed frame `cur`.
///
/// `phases` holds one accumulated phase offset per point of `prev` (it is
/// resized first if it does not) and is replaced by one per point of the
/// result. With `decay == 1`, `prev == cur` and zeroed offsets the result
/// carries `cur`'s amplitudes and phases, so the analysis resynthesizes
/// unchanged.
pub fn interpolate_with(
    prev: &Frame,
    cur: &Frame,
    phases: &mut Vec<f64>,
    window_seconds: f64,
    decay: f64,
    options: &TransportOptions,
) -> Result<Frame> {
    validate_frame(prev, "previous")?;
    validate_frame(cur, "current")?;
    validate_decay(decay)?;
    if !window_seconds.is_finite() || window_seconds <= 0.0 {
        return Err(MorphError::InvalidConfig(format!(
            "window duration must be positive, got {window_seconds}s"
        )));
    }

    phases.resize(prev.len(), 0.0);
    let hop_seconds = window_seconds / 2.0;
    let approach = 1.0 - decay;

    let fading = |i: usize, mass: f64| {
        let from = prev.points[i];
        Glided {
            point: SpectralPoint::with_phase(
                from.frequency,
                decay * mass,
                wrap_phase(from.phase + TAU * from.frequency * hop_seconds),
            ),
            offset: wrap_phase(phases[i]),
        }
    };
    let emerging = |j: usize, mass: f64| {
        let to = cur.points[j];
        Glided {
            point: SpectralPoint::with_phase(to.frequency, approach * mass, wrap_phase(to.phase)),
            offset: 0.0,
        }
    };

    let mut pieces = Vec::new();
    for t in transport_plan(prev, cur) {
        match (t.from, t.to) {
            (Some(i), Some(j)) => {
                let (from, to) = (prev.points[i], cur.points[j]);
                if octave_distance(from.frequency, to.frequency) > options.max_glide_octaves {
                    pieces.push(fading(i, t.mass));
                    pieces.push(emerging(j, t.mass));
                    continue;
                }
                let frequency = decay * from.frequency + approach * to.frequency;
                let offset =
                    wrap_phase(phases[i] + TAU * (frequency - to.frequency) * hop_seconds);
                pieces.push(Glided {
                    point: SpectralPoint::with_phase(
                        frequency,
                        decay * t.mass + approach * t.mass,
                        wrap_phase(to.phase + offset),
                    ),
                    offset,
                });
            }
            (Some(i), None) => pieces.push(fading(i, t.mass)),
            (None, Some(j)) => pieces.push(emerging(j, t.mass)),
            (None, None) => {}
        }
    }

    // Crossfaded pieces sit at their own frequencies and may be out of order.
    pieces.sort_by(|a, b| a.point.frequency.total_cmp(&b.point.frequency));
    let pieces = merge_close_points(pieces, options.merge_width_hz);

    phases.clear();
    phases.extend(pieces.iter().map(|g| g.offset));
    Ok(Frame::new(pieces.into_iter().map(|g| g.point).collect()))
}

/// Merge runs of sorted points lying within `width` Hz of the run's first point.
///
/// Amplitudes add, the frequency becomes the amplitude-weighted mean and the
/// phase is taken from the loudest member.
fn merge_close_points(pieces: Vec<Glided>, width: f64) -> Vec<Glided> {
    let mut merged: Vec<Glided> = Vec::with_capacity(pieces.len());
    let mut group_start = f64::NAN;
    let mut weighted = 0.0;
    let mut loudest = 0.0;

    for piece in pieces {
        let point = piece.point;
        let joins = merged
            .last()
            .is_some_and(|_| point.frequency - group_start <= width);
        if !joins {
            group_start = point.frequency;
            weighted = point.frequency * point.amplitude;
            loudest = point.amplitude;
            merged.push(piece);
            continue;
        }
        let Some(last) = merged.last_mut() else {
            continue;
        };
        last.point.amplitude += point.amplitude;
        weighted += point.frequency * point.amplitude;
        if point.amplitude > loudest {
            loudest = point.amplitude;
            last.point.phase = point.phase;
            last.offset = piece.offset;
        }
        if last.point.amplitude > 0.0 {
            last.point.frequency = weighted / last.point.amplitude;
        }
    }

    merged
}

/// Carried state of the glide fold for one channel.
#[derive(Clone, Debug)]
pub struct GlideState {
    pub carried: Frame,
    pub phases: Vec<f64>,
}

/// Parameters of the glide fold.
#[derive(Clone, Copy, Debug)]
pub struct Glide {
    pub window_seconds: f64,
    pub decay: f64,
    pub options: TransportOptions,
}

impl GlideState {
    /// Start the fold from an analyzed frame. Its measured phases seed the
    /// output and every offset starts at zero.
    pub fn new(first: Frame) -> Self {
        let phases = vec![0.0; first.len()];
        Self {
            carried: first,
            phases,
        }
    }

    /// One fold step: `(state, frame) -> (state', glided frame)`.
    pub fn step(self, cur: &Frame, glide: &Glide) -> Result<(GlideState, Frame)> {
        let GlideState {
            carried,
            mut phases,
        } = self;
        let next = interpolate_with(
            &carried,
            cur,
            &mut phases,
            glide.window_seconds,
            glide.decay,
            &glide.options,
        )?;
        let state = GlideState {
            carried: next.clone(),
            phases,
        };
        Ok((state, next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(points: &[(f64, f64)]) -> Frame {
        Frame::new(
            points
                .iter()
                .map(|&(f, a)| SpectralPoint::new(f, a))
                .collect(),
        )
    }

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    fn matched_mass(plan: &[Transfer]) -> f64 {
        plan.iter().filter(|t| t.is_matched()).map(|t| t.mass).sum()
    }

    fn one_sided_mass(plan: &[Transfer]) -> f64 {
        plan.iter().filter(|t| !t.is_matched()).map(|t| t.mass).sum()
    }

    #[test]
    fn fades_and_emerges_across_an_octave() {
        let prev = frame(&[(100.0, 1.0)]);
        let cur = frame(&[(100.0, 0.0), (200.0, 1.0)]);
        let mut phases = vec![0.0];
        let out = interpolate(&prev, &cur, &mut phases, 0.05, 0.5).unwrap();

        assert_eq!(out.len(), 2);
        assert!(close(out.points[0].frequency, 100.0, 1e-9));
        assert!(close(out.points[0].amplitude, 0.5, 1e-12));
        assert!(close(out.points[1].frequency, 200.0, 1e-9));
        assert!(close(out.points[1].amplitude, 0.5, 1e-12));
        assert!(close(out.mass(), 1.0, 1e-12));
        assert_eq!(phases.len(), 2);
    }

    #[test]
    fn empty_frames_are_degenerate() {
        let full = frame(&[(100.0, 1.0)]);
        let empty = Frame::default();
        let mut phases = Vec::new();
        assert_eq!(
            interpolate(&empty, &full, &mut phases, 0.05, 0.5),
            Err(MorphError::DegenerateFrame { which: "previous" })
        );
        assert_eq!(
            interpolate(&full, &empty, &mut phases, 0.05, 0.5),
            Err(MorphError::DegenerateFrame { which: "current" })
        );
    }

    #[test]
    fn non_finite_mass_is_degenerate() {
        let full = frame(&[(100.0, 1.0)]);
        let nan = frame(&[(100.0, f64::NAN)]);
        let inf = frame(&[(100.0, 1.0), (200.0, f64::INFINITY)]);
        let mut phases = vec![0.0];
        assert_eq!(
            interpolate(&nan, &nan, &mut phases, 0.05, 0.5),
            Err(MorphError::DegenerateFrame { which: "previous" })
        );
        assert_eq!(
            interpolate(&full, &inf, &mut phases, 0.05, 0.5),
            Err(MorphError::DegenerateFrame { which: "current" })
        );
    }

    #[test]
    fn plan_walk_terminates_on_nan() {
        let prev = frame(&[(100.0, f64::NAN), (200.0, 1.0), (300.0, 1.0)]);
        let cur = frame(&[(100.0, f64::NAN), (250.0, 2.0)]);
        let plan = transport_plan(&prev, &cur);
        assert!(plan.len() <= prev.len() + cur.len());
    }

    #[test]
    fn decay_out_of_range_is_rejected() {
        let f = frame(&[(100.0, 1.0)]);
        let mut phases = vec![0.0];
        for decay in [1.5, 0.0, -0.2, f64::NAN] {
            assert!(matches!(
                interpolate(&f, &f, &mut phases, 0.05, decay),
                Err(MorphError::InvalidDecay(_))
            ));
        }
    }

    #[test]
    fn plan_conserves_mass() {
        let prev = frame(&[(100.0, 0.2), (150.0, 1.3), (300.0, 0.5), (310.0, 0.0)]);
        let cur = frame(&[(90.0, 0.7), (160.0, 0.1), (250.0, 2.0)]);
        let plan = transport_plan(&prev, &cur);

        let (ma, mb) = (prev.mass(), cur.mass());
        assert!(close(matched_mass(&plan), ma.min(mb), 1e-12));
        assert!(close(one_sided_mass(&plan), (ma - mb).abs(), 1e-12));
        // The lighter frame has nothing left over.
        assert!(plan.iter().all(|t| t.to.is_some()));

        // Every piece of every point is accounted for.
        for (i, p) in prev.points.iter().enumerate() {
            let moved: f64 = plan
                .iter()
                .filter(|t| t.from == Some(i))
                .map(|t| t.mass)
                .sum();
            assert!(close(moved, p.amplitude, 1e-12));
        }
        for (j, p) in cur.points.iter().enumerate() {
            let arrived: f64 = plan
                .iter()
                .filter(|t| t.to == Some(j))
                .map(|t| t.mass)
                .sum();
            assert!(close(arrived, p.amplitude, 1e-12));
        }
    }

    #[test]
    fn plan_is_monotone_and_splits_points() {
        let prev = frame(&[(100.0, 1.0), (200.0, 1.0)]);
        let cur = frame(&[(110.0, 0.5), (150.0, 1.0), (210.0, 0.5)]);
        let plan = transport_plan(&prev, &cur);

        assert!(plan.iter().all(Transfer::is_matched));
        for pair in plan.windows(2) {
            assert!(pair[0].from <= pair[1].from);
            assert!(pair[0].to <= pair[1].to);
        }
        // The middle point of `cur` straddles the boundary between the two
        // points of `prev` and is split in half.
        let pieces: Vec<&Transfer> = plan.iter().filter(|t| t.to == Some(1)).collect();
        assert_eq!(pieces.len(), 2);
        assert!(close(pieces[0].mass, 0.5, 1e-12));
        assert!(close(pieces[1].mass, 0.5, 1e-12));
        assert_eq!(plan.len(), 4);
    }

    #[test]
    fn heavier_frame_leaves_one_sided_mass() {
        let plan = transport_plan(&frame(&[(100.0, 2.0)]), &frame(&[(105.0, 1.0)]));
        assert_eq!(
            plan,
            vec![Transfer::matched(0, 0, 1.0), Transfer::fading(0, 1.0)]
        );

        let prev = frame(&[(100.0, 2.0)]);
        let cur = frame(&[(105.0, 1.0), (110.0, 3.0)]);
        let plan = transport_plan(&prev, &cur);
        assert_eq!(plan.len(), 3);
        assert_eq!(plan[0], Transfer::matched(0, 0, 1.0));
        assert_eq!(plan[1], Transfer::matched(0, 1, 1.0));
        assert_eq!(plan[2], Transfer::emerging(1, 2.0));
    }

    #[test]
    fn unequal_masses_glide_toward_the_current_total() {
        let prev = frame(&[(100.0, 2.0)]);
        let cur = frame(&[(105.0, 1.0)]);
        let mut phases = vec![0.0];
        let out = interpolate(&prev, &cur, &mut phases, 0.05, 0.25).unwrap();

        assert!(close(out.mass(), 0.25 * 2.0 + 0.75 * 1.0, 1e-12));
        assert_eq!(out.len(), 2);
        // The excess fades at its own frequency, the rest glides.
        assert!(close(out.points[0].frequency, 100.0, 1e-12));
        assert!(close(out.points[0].amplitude, 0.25, 1e-12));
        assert!(close(out.points[1].frequency, 103.75, 1e-9));
        assert!(close(out.points[1].amplitude, 1.0, 1e-12));
    }

    #[test]
    fn silent_frame_only_emerges() {
        let prev = frame(&[(100.0, 0.0), (200.0, 0.0)]);
        let cur = frame(&[(150.0, 1.0)]);
        let plan = transport_plan(&prev, &cur);
        assert_eq!(matched_mass(&plan), 0.0);
        let emerged: f64 = plan
            .iter()
            .filter(|t| t.from.is_none())
            .map(|t| t.mass)
            .sum();
        assert!(close(emerged, 1.0, 1e-12));

        let mut phases = vec![0.0, 0.0];
        let out = interpolate(&prev, &cur, &mut phases, 0.05, 0.25).unwrap();
        assert!(close(out.mass(), 0.75, 1e-12));
        assert!(out.is_sorted());
    }

    #[test]
    fn decay_one_keeps_previous_frame() {
        let prev = frame(&[(100.0, 0.4), (180.0, 1.0), (400.0, 0.3)]);
        let cur = frame(&[(120.0, 1.0), (200.0, 0.2), (390.0, 0.6), (900.0, 0.5)]);
        let mut phases = vec![0.0; 3];
        let out = interpolate(&prev, &cur, &mut phases, 0.05, 1.0).unwrap();

        let audible: Vec<&SpectralPoint> =
            out.points.iter().filter(|p| p.amplitude > 1e-12).collect();
        assert_eq!(audible.len(), prev.len());
        for (p, q) in audible.iter().zip(&prev.points) {
            assert!(close(p.frequency, q.frequency, 1e-9));
            assert!(close(p.amplitude, q.amplitude, 1e-12));
        }
    }

    #[test]
    fn decay_one_on_itself_returns_analyzed_phases() {
        let analyzed = Frame::new(vec![
            SpectralPoint::with_phase(0.0, 0.1, 0.0),
            SpectralPoint::with_phase(31.25, 0.7, 2.5),
            SpectralPoint::with_phase(62.5, 0.0, -1.0),
            SpectralPoint::with_phase(93.75, 1.2, -3.0),
        ]);
        let mut phases = Vec::new();
        let out = interpolate(&analyzed, &analyzed, &mut phases, 0.032, 1.0).unwrap();

        assert_eq!(out.len(), analyzed.len());
        for (p, q) in out.points.iter().zip(&analyzed.points) {
            assert_eq!(p.frequency, q.frequency);
            assert!(close(p.amplitude, q.amplitude, 1e-12));
            assert!(close(p.phase, q.phase, 1e-12));
        }
        assert!(phases.iter().all(|&offset| offset == 0.0));
    }

    #[test]
    fn small_decay_converges_to_current_frame() {
        let prev = frame(&[(100.0, 0.4), (180.0, 1.0), (400.0, 0.3)]);
        let cur = frame(&[(120.0, 1.0), (200.0, 0.2), (390.0, 0.6), (900.0, 0.5)]);
        let mut phases = vec![0.0; 3];
        let out = interpolate(&prev, &cur, &mut phases, 0.05, 1e-9).unwrap();

        assert!(close(out.mass(), cur.mass(), 1e-6));
        for q in &cur.points {
            let near: f64 = out
                .points
                .iter()
                .filter(|p| (p.frequency - q.frequency).abs() < 1e-3)
                .map(|p| p.amplitude)
                .sum();
            assert!(close(near, q.amplitude, 1e-6), "{} Hz: {near}", q.frequency);
        }
    }

    #[test]
    fn output_is_sorted_and_phases_track_length() {
        let prev = frame(&[(50.0, 0.1), (100.0, 1.0), (1000.0, 0.5)]);
        let cur = frame(&[(60.0, 0.3), (400.0, 0.8), (1100.0, 0.4), (5000.0, 0.2)]);
        let mut phases = vec![0.3, -1.0, 2.0];
        let out = interpolate(&prev, &cur, &mut phases, 0.05, 0.7).unwrap();

        assert!(out.is_sorted());
        assert_eq!(phases.len(), out.len());
        assert!(out.len() >= prev.len().max(cur.len()));
        assert!(phases.iter().all(|p| (-PI..PI).contains(p)));
        assert!(out.points.iter().all(|p| (-PI..PI).contains(&p.phase)));
    }

    #[test]
    fn fading_point_advances_at_its_frequency() {
        let prev = frame(&[(110.0, 1.0)]);
        let cur = Frame::new(vec![SpectralPoint::with_phase(440.0, 1.0, 0.7)]);
        let mut phases = vec![0.0];
        let out = interpolate(&prev, &cur, &mut phases, 0.05, 0.5).unwrap();

        assert_eq!(out.len(), 2);
        let expected = wrap_phase(TAU * 110.0 * 0.025);
        assert!(close(out.points[0].phase, expected, 1e-12));
        // Emerging energy starts from the analyzed phase.
        assert!(close(out.points[1].phase, 0.7, 1e-12));
    }

    #[test]
    fn matched_point_follows_analyzed_phase_plus_detuning() {
        let prev = Frame::new(vec![SpectralPoint::with_phase(100.0, 1.0, 0.2)]);
        let cur = Frame::new(vec![SpectralPoint::with_phase(110.0, 1.0, 0.3)]);
        let mut phases = vec![0.1];
        let out = interpolate(&prev, &cur, &mut phases, 0.05, 0.5).unwrap();

        assert_eq!(out.len(), 1);
        assert!(close(out.points[0].frequency, 105.0, 1e-12));
        let offset = wrap_phase(0.1 + TAU * (105.0 - 110.0) * 0.025);
        assert!(close(phases[0], offset, 1e-12));
        assert!(close(out.points[0].phase, wrap_phase(0.3 + offset), 1e-12));
    }

    #[test]
    fn mismatched_phase_length_is_resized() {
        let prev = frame(&[(100.0, 1.0), (200.0, 1.0)]);
        let mut phases = vec![f64::NAN];
        let out = interpolate(&prev, &prev, &mut phases, 0.05, 0.5).unwrap();
        assert_eq!(phases.len(), out.len());
        assert!(phases.iter().all(|p| p.is_finite()));
        assert!(out.points.iter().all(|p| p.phase.is_finite()));
    }

    #[test]
    fn merge_width_bounds_point_count() {
        let prev = frame(&[(100.0, 1.0), (101.0, 1.0), (102.0, 1.0)]);
        let cur = frame(&[(100.5, 1.0), (101.5, 1.0), (102.5, 1.0)]);
        let options = TransportOptions {
            merge_width_hz: 5.0,
            ..TransportOptions::default()
        };
        let mut phases = vec![0.0; 3];
        let out = interpolate_with(&prev, &cur, &mut phases, 0.05, 0.5, &options).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(phases.len(), 1);
        assert!(close(out.mass(), 3.0, 1e-12));
        assert!(out.points[0].frequency > 100.0 && out.points[0].frequency < 102.5);
    }

    #[test]
    fn fold_threads_state() {
        let frames = [
            frame(&[(100.0, 1.0)]),
            frame(&[(110.0, 1.0)]),
            frame(&[(120.0, 0.5), (125.0, 0.5)]),
        ];
        let glide = Glide {
            window_seconds: 0.05,
            decay: 0.5,
            options: TransportOptions::default(),
        };
        let mut state = GlideState::new(frames[0].clone());
        for f in &frames {
            let (next, out) = state.step(f, &glide).unwrap();
            assert_eq!(next.carried, out);
            assert_eq!(next.phases.len(), out.len());
            state = next;
        }
        assert!(close(state.carried.mass(), 1.0, 1e-12));
        let centroid: f64 = state
            .carried
            .points
            .iter()
            .map(|p| p.frequency * p.amplitude)
            .sum::<f64>();
        assert!(centroid > 110.0 && centroid < 122.5);
    }
}

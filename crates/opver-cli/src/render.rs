use std::fmt::{self, Write};

use opver_engine::{CoincidenceBound, Probability, Verdict, VerificationReport};

fn probability(p: &Probability) -> String {
    if p.value > 0.0 {
        format!("{:.3e} (2^{})", p.value, p.log2)
    } else {
        format!("10^{:.1} (2^{})", p.log10(), p.log2)
    }
}

fn write_bound(out: &mut impl Write, bound: &CoincidenceBound) -> fmt::Result {
    writeln!(out, "single-trial bound:   {}", probability(&bound.single_trial))?;
    writeln!(out, "trials:               {}", bound.trials)?;
    writeln!(out, "compounded bound:     {}", probability(&bound.compounded))?;
    writeln!(out, "confidence:           {}", bound.confidence)
}

fn write_headline(out: &mut impl Write, verdict: &Verdict) -> fmt::Result {
    match verdict {
        Verdict::Confirmed => write!(out, "confirmed: evaluators agree on every probe"),
        Verdict::DiscrepancyDetected => {
            write!(out, "discrepancy detected: evaluated, but evaluators disagree")
        }
        Verdict::Failed(err) => {
            write!(out, "failed: could not evaluate ({})", err.family())?;
            if let Some(probe) = err.probe() {
                write!(out, " at probe {probe}")?;
            }
            if let Some(side) = err.side() {
                write!(out, " on the {side} side")?;
            }
            write!(out, ": {}", err.info().message)
        }
    }
}

fn write_report(out: &mut impl Write, report: &VerificationReport) -> fmt::Result {
    write!(out, "verdict:              ")?;
    write_headline(out, &report.verdict)?;
    writeln!(out)?;
    if let Some(domain) = &report.domain {
        writeln!(
            out,
            "domain:               {} probes in {}D ({} requested)",
            domain.actual, domain.dimension, domain.requested
        )?;
    }
    if let Some(summary) = &report.summary {
        writeln!(
            out,
            "global norm:          {:.3e} ({})",
            summary.global_norm,
            summary.magnitude.label()
        )?;
        writeln!(
            out,
            "support:              {} of {} probes exceed {:e}",
            summary.support.len(),
            summary.evaluated,
            summary.tolerance
        )?;
        if let Some(probe) = summary.max_probe {
            writeln!(
                out,
                "max local error:      {:.3e} at probe {probe}",
                summary.max_norm
            )?;
        }
    }
    if !report.excluded.is_empty() {
        let probes: Vec<String> = report
            .excluded
            .iter()
            .map(|excluded| excluded.probe.to_string())
            .collect();
        writeln!(out, "excluded probes:      {}", probes.join(", "))?;
    }
    if let Some(complexity) = &report.complexity {
        writeln!(
            out,
            "K(reference):         {} bits (upper-bound proxy)",
            complexity.reference_bits
        )?;
        writeln!(
            out,
            "K(candidate):         {} bits (upper-bound proxy)",
            complexity.candidate_bits
        )?;
        writeln!(out, "K(field):             {} bits", complexity.field_bits)?;
        writeln!(out, "log2 |gap|:           {:.2}", complexity.log2_gap)?;
        writeln!(out, "forced vanishing:     {}", complexity.forced_vanishing)?;
    }
    if let Some(bound) = &report.bound {
        write_bound(out, bound)?;
    }
    if let Some(spot) = &report.spot_check {
        writeln!(
            out,
            "spot check:           {}/{} agree, max error {:.3e}",
            spot.agreement_count, spot.total_probes, spot.max_local_error
        )?;
    }
    Ok(())
}

pub fn render_bound(bound: &CoincidenceBound) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_bound(&mut out, bound)?;
    Ok(out)
}

pub fn render_report(report: &VerificationReport) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_report(&mut out, report)?;
    Ok(out)
}

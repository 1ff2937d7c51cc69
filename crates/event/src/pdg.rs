//! PDG code to particle name lookup.
//!
//! Names follow the Pythia8 printing convention. Antiparticles are derived
//! from the particle entry: a trailing charge sign is flipped, otherwise
//! "bar" is appended (u -> ubar, e- -> e+, nu_e -> nu_ebar).

use once_cell::sync::Lazy;
use std::collections::HashMap;

static PDG_NAMES: Lazy<HashMap<i64, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (1, "d"),
        (2, "u"),
        (3, "s"),
        (4, "c"),
        (5, "b"),
        (6, "t"),
        (11, "e-"),
        (12, "nu_e"),
        (13, "mu-"),
        (14, "nu_mu"),
        (15, "tau-"),
        (16, "nu_tau"),
        (21, "g"),
        (22, "gamma"),
        (23, "Z0"),
        (24, "W+"),
        (25, "h0"),
        (90, "system"),
        // diquarks
        (1103, "dd_1"),
        (2101, "ud_0"),
        (2103, "ud_1"),
        (2203, "uu_1"),
        // light and strange mesons
        (111, "pi0"),
        (211, "pi+"),
        (113, "rho0"),
        (213, "rho+"),
        (221, "eta"),
        (223, "omega"),
        (331, "eta'"),
        (333, "phi"),
        (130, "K_L0"),
        (310, "K_S0"),
        (311, "K0"),
        (321, "K+"),
        // charm and bottom mesons
        (411, "D+"),
        (421, "D0"),
        (431, "D_s+"),
        (443, "J/psi"),
        (511, "B0"),
        (521, "B+"),
        (531, "B_s0"),
        (541, "B_c+"),
        (553, "Upsilon"),
        // baryons
        (2112, "n0"),
        (2212, "p+"),
        (3122, "Lambda0"),
        (3112, "Sigma-"),
        (3212, "Sigma0"),
        (3222, "Sigma+"),
        (3312, "Xi-"),
        (3322, "Xi0"),
        (3334, "Omega-"),
        (4122, "Lambda_c+"),
        (5122, "Lambda_b0"),
    ])
});

/// Name for a PDG code, falling back to the code itself when unknown.
pub fn particle_name(pdgid: i64) -> String {
    match PDG_NAMES.get(&pdgid.abs()) {
        Some(name) if pdgid >= 0 => (*name).to_string(),
        Some(name) => antiparticle_name(name),
        None => pdgid.to_string(),
    }
}

fn antiparticle_name(name: &str) -> String {
    if let Some(stem) = name.strip_suffix('+') {
        format!("{stem}-")
    } else if let Some(stem) = name.strip_suffix('-') {
        format!("{stem}+")
    } else {
        format!("{name}bar")
    }
}

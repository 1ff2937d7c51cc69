pub mod particle;
pub mod pdg;

pub use particle::{
    EdgeParticle, EventInfo, Kinematics, NodeParticle, Particle, Representation,
};

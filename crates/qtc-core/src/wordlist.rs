//! Seed phrase wordlist
//!
//! The order of [`WORDLIST`] is part of the wallet format: a word's index
//! is what generation draws. Changing or reordering it invalidates every
//! existing seed phrase, so any extension must bump [`WORDLIST_VERSION`].

/// Current wordlist version
pub const WORDLIST_VERSION: u8 = 1;

/// Number of words in the list
pub const WORDLIST_LEN: usize = 70;

/// Version 1 wordlist: 70 unique lowercase ASCII words.
pub static WORDLIST: [&str; WORDLIST_LEN] = [
    "quantum", "particle", "energy", "wave", "photon", "electron",
    "neutron", "proton", "atomic", "nucleus", "orbital", "spin",
    "entangle", "coherent", "superpose", "collapse", "tunnel", "field",
    "crystal", "lattice", "phonon", "boson", "fermion", "lepton",
    "hadron", "quark", "gluon", "plasma", "fusion", "fission",
    "isotope", "element", "molecule", "compound", "reaction", "catalyst",
    "enzyme", "protein", "genome", "helix", "strand", "sequence",
    "cipher", "encrypt", "decrypt", "secure", "protect", "shield",
    "fortress", "vault", "lock", "key", "access", "verify",
    "cosmos", "galaxy", "stellar", "nebula", "pulsar", "quasar",
    "planet", "orbit", "gravity", "velocity", "momentum", "force",
    "matrix", "vector", "tensor", "scalar",
];

/// Look up a word (case-insensitive). Returns its index in [`WORDLIST`].
pub fn index_of(word: &str) -> Option<usize> {
    WORDLIST.iter().position(|w| w.eq_ignore_ascii_case(word))
}

/// Word at `index`, if in range.
pub fn word_at(index: usize) -> Option<&'static str> {
    WORDLIST.get(index).copied()
}

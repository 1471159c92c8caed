//! Static lookup from law branch ("ramo do direito") to study area.
//!
//! A judgment can carry several branches, so the area is derived per exploded
//! row rather than per judgment. Branches missing from the table fall into
//! [`DEFAULT_AREA`].

use std::collections::HashMap;
use std::sync::LazyLock;

/// Area assigned to any branch not present in the lookup table.
pub const DEFAULT_AREA: &str = "Outras Áreas";

const BRANCH_AREAS: &[(&str, &str)] = &[
    ("Direito Constitucional", "Direito Público"),
    ("Direito Administrativo", "Direito Público"),
    ("Direito Tributário", "Direito Público"),
    ("Direito Financeiro", "Direito Público"),
    ("Direito Eleitoral", "Direito Público"),
    ("Direito Ambiental", "Direito Público"),
    ("Direito Urbanístico", "Direito Público"),
    ("Direito Penal", "Direito Penal"),
    ("Direito Processual Penal", "Direito Penal"),
    ("Direito Civil", "Direito Privado"),
    ("Direito Empresarial", "Direito Privado"),
    ("Direito Comercial", "Direito Privado"),
    ("Direito do Consumidor", "Direito Privado"),
    ("Direito Processual Civil", "Direito Processual"),
    ("Direito do Trabalho", "Direito Social / Trabalho"),
    ("Direito Processual do Trabalho", "Direito Social / Trabalho"),
    ("Direito Previdenciário", "Direito Social / Previdenciário"),
    ("Direito Internacional Público", "Direito Internacional"),
    ("Direito Internacional Privado", "Direito Internacional"),
];

static AREA_BY_BRANCH: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| BRANCH_AREAS.iter().copied().collect());

/// Study area for a branch tag. Exact, case-sensitive match on the tag.
pub fn area_for(branch: &str) -> &'static str {
    AREA_BY_BRANCH.get(branch).copied().unwrap_or(DEFAULT_AREA)
}

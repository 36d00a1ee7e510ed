//! Static task catalog: which checklist items belong to each shift kind.
//!
//! The catalog is a fixed table compiled into the binary — shift kind →
//! ordered subcategories → ordered task texts. There is no mutation
//! path; changing the checklist means shipping a new build. Shifts
//! materialized before a catalog change keep their original task set
//! (see [`crate::provision::ensure_tasks`]).

use crate::model::ShiftKind;


/// One ordered group of checklist items within a shift kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subcategory {
    /// Stable key persisted on every task row (`Task::subcategory`).
    pub key: &'static str,
    /// Human-readable group title.
    pub title: &'static str,
    /// Ordered checklist texts.
    pub tasks: &'static [&'static str],
}

const OPENING: &[Subcategory] = &[
    Subcategory {
        key: "terraza",
        title: "Montaje de Terraza",
        tasks: &[
            "Sacar mesas y sillas",
            "Ordenar terraza",
            "Instalar calefacción",
            "Limpiar mesas y sillas",
            "Colocar QR y velas",
        ],
    },
    Subcategory {
        key: "salon",
        title: "Limpieza del Salón",
        tasks: &[
            "Sanitizar superficies",
            "Barrer y trapear",
            "Revisar baños",
            "Encender climatización y TV",
            "Verificar música ambiental",
        ],
    },
    Subcategory {
        key: "miseEnPlace",
        title: "Área de Garzón",
        tasks: &[
            "Abastecer insumos",
            "Verificar Transbank",
            "Conocer 86s y promos",
            "Alinear equipo",
            "Revisar uniformes",
        ],
    },
];

const CLOSING: &[Subcategory] = &[
    Subcategory {
        key: "preCierre",
        title: "Preparativos",
        tasks: &[
            "Anunciar última ronda",
            "Tomar últimos pedidos",
            "Iniciar limpieza gradual",
        ],
    },
    Subcategory {
        key: "salonCierre",
        title: "Cierre de Salón",
        tasks: &[
            "Recolectar loza",
            "Barrer y trapear",
            "Limpiar mesas y sillas",
            "Limpieza profunda de baños",
            "Rellenar salsas y reponer insumos",
            "Apagar TV y música",
        ],
    },
    Subcategory {
        key: "terrazaCierre",
        title: "Cierre de Terraza",
        tasks: &[
            "Recolectar loza",
            "Limpiar y guardar mesas/sillas",
            "Retirar gas de estufas",
            "Guardar carteles y artefactos",
            "Barrer y lavar piso (si aplica)",
            "Apagar calefacción",
        ],
    },
    Subcategory {
        key: "final",
        title: "Cierre General",
        tasks: &[
            "Verificar carga de Transbank",
            "Apagar artefactos y luces",
            "Cerrar llaves de agua",
            "Marcar salida",
            "Activar alarma",
        ],
    },
];

/// Checklist title for a shift kind.
#[must_use]
pub const fn title(kind: ShiftKind) -> &'static str {
    match kind {
        ShiftKind::Opening => "Apertura",
        ShiftKind::Closing => "Cierre del Local",
    }
}

/// The ordered subcategories of a shift kind.
#[must_use]
pub const fn subcategories(kind: ShiftKind) -> &'static [Subcategory] {
    match kind {
        ShiftKind::Opening => OPENING,
        ShiftKind::Closing => CLOSING,
    }
}

/// Flattens a kind's catalog into `(subcategory key, task text)` pairs,
/// in catalog order.
pub fn checklist(kind: ShiftKind) -> impl Iterator<Item = (&'static str, &'static str)> {
    subcategories(kind)
        .iter()
        .flat_map(|sub| sub.tasks.iter().map(|text| (sub.key, *text)))
}

/// Number of tasks a freshly materialized shift of this kind carries.
#[must_use]
pub fn task_count(kind: ShiftKind) -> usize {
    subcategories(kind).iter().map(|sub| sub.tasks.len()).sum()
}

//! The static resource catalog: spaces, equipment, time slots, groups and
//! teachers.
//!
//! Everything here is configuration consumed at startup. Nothing in the
//! catalog is created or destroyed at runtime.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// Resource name used in reports when a reservation points at an id the
/// catalog does not know.
pub const UNKNOWN_RESOURCE: &str = "unknown resource";

// ─── Kind ────────────────────────────────────────────────────────────────────

/// The two disjoint resource catalogs. Each kind also names its own store
/// partition.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
  #[default]
  Space,
  Equipment,
}

impl ResourceKind {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Space => "space",
      Self::Equipment => "equipment",
    }
  }

  /// Whether reservations of this kind must carry a group label.
  pub fn requires_group(self) -> bool { matches!(self, Self::Space) }
}

impl fmt::Display for ResourceKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for ResourceKind {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "space" => Ok(Self::Space),
      "equipment" => Ok(Self::Equipment),
      other => Err(Error::UnknownKind(other.to_owned())),
    }
  }
}

// ─── Resource ────────────────────────────────────────────────────────────────

/// A bookable room or item. `id` is unique within its kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
  pub id:           String,
  pub display_name: String,
}

impl Resource {
  pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
    Self { id: id.into(), display_name: display_name.into() }
  }
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

/// All fixed enumerations the booking workflow consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
  pub spaces:    Vec<Resource>,
  pub equipment: Vec<Resource>,
  /// Ordered class periods, shared by every resource.
  pub slots:     Vec<String>,
  pub groups:    Vec<String>,
  pub teachers:  Vec<String>,
}

impl Catalog {
  /// The catalog the school deployment ships with.
  pub fn builtin() -> Self {
    let spaces = [
      ("informatica1", "Laboratório de Informática I"),
      ("informatica2", "Laboratório de Informática II"),
      ("salaVideo", "Sala de Vídeo"),
      ("labCiencias", "Laboratório de Ciências"),
      ("biblioteca", "Biblioteca"),
      ("labmatematica", "Laboratório de Matemática"),
    ];
    let equipment = [
      ("projetorEpson", "Projetor Epson"),
      ("projetorBenq", "Projetor Benq"),
      ("smartvSamsung", "Smartv Samsung"),
      ("caixaSom", "Caixa de Som"),
      ("smarttvAOC", "Smart TV AOC"),
      ("projetorGoldentec", "Projetor Goldentec"),
      ("smartvCordenacaodearea", "Smartv coordenação de área"),
      ("smartvInformaticaI", "Smartv Informática I"),
      ("smartvInformaticaII", "Smartv Informática II"),
      ("smartvSaladevideo", "Smartv sala de vídeo"),
    ];
    let slots = [
      "07:15 - 08:05",
      "08:05 - 08:55",
      "09:15 - 10:05",
      "10:05 - 10:55",
      "10:55 - 11:45",
      "13:10 - 14:00",
      "14:00 - 14:50",
      "15:10 - 16:00",
      "16:00 - 16:50",
    ];
    let groups = [
      "1ª Série A (Integral)",
      "1ª Série B (Integral)",
      "2ª Série A (Integral)",
      "2ª Série B (Integral)",
      "3ª Série A (Integral)",
      "3ª Série B (Integral)",
    ];
    let mut teachers = vec![
      "ALBERTO JUNIOR GONCALVES RIBEIRO",
      "ANA ANDREIA DE ARAUJO GOMES",
      "ANA LIVIA MARIA MACEDO E CAMPOS",
      "ANTONIO GENILSON VIEIRA DE PAIVA",
      "AVELINO GOMES FERREIRA NETO",
      "DAIANE OLIVEIRA MIRANDA",
      "DENILSON SAMPAIO SOARES",
      "DOMINGOS MESQUITA ALVES",
      "ELAINE CRISTINA SALES BEZERRA DA SILVA",
      "FRANCISCA MIRELY SAMPAIO CARVALHO",
      "FRANCISCO ALAN DOS SANTOS ALMEIDA",
      "FRANCISCO CLEIGIVAN DA ROCHA MARTINS",
      "GABRIEL CAMELO DA COSTA",
      "JOSE IRAN PEREIRA VERAS",
      "LUIZ ROGEAN VIEIRA BATISTA",
      "MARIA DO MONTE SERRAT VERAS DE MESQUITA",
      "MARIA GLEYCIENE SOARES DE SOUZA",
      "WENITHON CARLOS DE SOUSA",
    ];
    teachers.sort_unstable();

    Self {
      spaces:    spaces.iter().map(|(id, name)| Resource::new(*id, *name)).collect(),
      equipment: equipment.iter().map(|(id, name)| Resource::new(*id, *name)).collect(),
      slots:     slots.iter().map(|s| s.to_string()).collect(),
      groups:    groups.iter().map(|s| s.to_string()).collect(),
      teachers:  teachers.into_iter().map(str::to_owned).collect(),
    }
  }

  /// All resources of one kind, in catalog order.
  pub fn resources(&self, kind: ResourceKind) -> &[Resource] {
    match kind {
      ResourceKind::Space => &self.spaces,
      ResourceKind::Equipment => &self.equipment,
    }
  }

  pub fn resource(&self, kind: ResourceKind, id: &str) -> Option<&Resource> {
    self.resources(kind).iter().find(|r| r.id == id)
  }

  /// Display name for `id`, or [`UNKNOWN_RESOURCE`] when the id is not in
  /// the catalog of that kind.
  pub fn resource_name(&self, kind: ResourceKind, id: &str) -> &str {
    self
      .resource(kind, id)
      .map(|r| r.display_name.as_str())
      .unwrap_or(UNKNOWN_RESOURCE)
  }
}

impl Default for Catalog {
  fn default() -> Self { Self::builtin() }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Department {
  Artigas,
  Canelones,
  CerroLargo,
  Colonia,
  Durazno,
  Flores,
  Florida,
  Lavalleja,
  Maldonado,
  Montevideo,
  Paysandu,
  RioNegro,
  Rivera,
  Rocha,
  Salto,
  SanJose,
  Soriano,
  Tacuarembo,
  TreintaYTres,
  #[default]
  #[serde(rename = "General")]
  General,
}

impl Department {
  pub const ALL: [Department; 20] = [
    Department::Artigas,
    Department::Canelones,
    Department::CerroLargo,
    Department::Colonia,
    Department::Durazno,
    Department::Flores,
    Department::Florida,
    Department::Lavalleja,
    Department::Maldonado,
    Department::Montevideo,
    Department::Paysandu,
    Department::RioNegro,
    Department::Rivera,
    Department::Rocha,
    Department::Salto,
    Department::SanJose,
    Department::Soriano,
    Department::Tacuarembo,
    Department::TreintaYTres,
    Department::General,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      Department::Artigas => "artigas",
      Department::Canelones => "canelones",
      Department::CerroLargo => "cerro-largo",
      Department::Colonia => "colonia",
      Department::Durazno => "durazno",
      Department::Flores => "flores",
      Department::Florida => "florida",
      Department::Lavalleja => "lavalleja",
      Department::Maldonado => "maldonado",
      Department::Montevideo => "montevideo",
      Department::Paysandu => "paysandu",
      Department::RioNegro => "rio-negro",
      Department::Rivera => "rivera",
      Department::Rocha => "rocha",
      Department::Salto => "salto",
      Department::SanJose => "san-jose",
      Department::Soriano => "soriano",
      Department::Tacuarembo => "tacuarembo",
      Department::TreintaYTres => "treinta-y-tres",
      Department::General => "General",
    }
  }
}

impl fmt::Display for Department {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, PartialEq, Eq)]
pub struct UnknownDepartment;

impl FromStr for Department {
  type Err = UnknownDepartment;

  fn from_str(value: &str) -> Result<Self, Self::Err> {
    let value = value.trim();
    Department::ALL
      .into_iter()
      .find(|department| department.as_str() == value)
      .ok_or(UnknownDepartment)
  }
}

//! Field catalog - the declarative schema shared by every layer
//!
//! The registry exists in two shapes: a minimal registration form and an
//! extended form carrying healthcare-visit and transport scheduling data.
//! Both are the same design parameterized by field list, so the table DDL,
//! the CRUD statements and the batch-import statement are all generated
//! from one catalog and can never drift apart.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One named, nullable text field of the person record.
///
/// `name` is the JSON-facing camelCase name; `column` is the snake_case
/// SQL column it maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub column: &'static str,
    /// Natural-key fields are NOT NULL UNIQUE; everything else is optional
    pub natural_key: bool,
}

const fn field(name: &'static str, column: &'static str) -> FieldDef {
    FieldDef { name, column, natural_key: false }
}

/// The single natural key: the national identifier (CNS or CPF).
pub const NATURAL_KEY: FieldDef = FieldDef {
    name: "cnsCpf",
    column: "cns_cpf",
    natural_key: true,
};

/// Fields of the minimal registration form
pub const MINIMAL_FIELDS: &[FieldDef] = &[
    field("nome", "nome"),
    NATURAL_KEY,
    field("dataNascimento", "data_nascimento"),
    field("sexo", "sexo"),
    field("telefone", "telefone"),
    field("endereco", "endereco"),
    field("bairro", "bairro"),
    field("municipio", "municipio"),
    field("cep", "cep"),
];

/// Fields of the extended form: registration plus visit/transport scheduling
pub const EXTENDED_FIELDS: &[FieldDef] = &[
    field("nome", "nome"),
    NATURAL_KEY,
    field("dataNascimento", "data_nascimento"),
    field("sexo", "sexo"),
    field("telefone", "telefone"),
    field("endereco", "endereco"),
    field("bairro", "bairro"),
    field("municipio", "municipio"),
    field("cep", "cep"),
    field("rg", "rg"),
    field("cartaoSus", "cartao_sus"),
    field("nomeMae", "nome_mae"),
    field("peso", "peso"),
    field("acompanhante", "acompanhante"),
    field("cnsCpfAcompanhante", "cns_cpf_acompanhante"),
    field("telefoneAcompanhante", "telefone_acompanhante"),
    field("procedimento", "procedimento"),
    field("especialidade", "especialidade"),
    field("localAtendimento", "local_atendimento"),
    field("municipioDestino", "municipio_destino"),
    field("dataViagem", "data_viagem"),
    field("horarioSaida", "horario_saida"),
    field("horarioAtendimento", "horario_atendimento"),
    field("tipoTransporte", "tipo_transporte"),
    field("veiculo", "veiculo"),
    field("motorista", "motorista"),
    field("pontoEmbarque", "ponto_embarque"),
    field("poltrona", "poltrona"),
    field("observacoes", "observacoes"),
];

/// Which field set the deployment runs with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaVariant {
    /// Registration data only
    Minimal,
    /// Registration plus scheduling/demographic fields
    #[default]
    Extended,
}

impl SchemaVariant {
    /// Get the string representation of the variant
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaVariant::Minimal => "minimal",
            SchemaVariant::Extended => "extended",
        }
    }

    /// The full ordered field catalog for this variant
    pub fn fields(&self) -> &'static [FieldDef] {
        match self {
            SchemaVariant::Minimal => MINIMAL_FIELDS,
            SchemaVariant::Extended => EXTENDED_FIELDS,
        }
    }

    /// The mandatory unique field every variant carries
    pub fn natural_key(&self) -> &'static FieldDef {
        &NATURAL_KEY
    }
}

impl FromStr for SchemaVariant {
    type Err = Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "minimal" | "min" => Ok(SchemaVariant::Minimal),
            "extended" | "ext" | "full" => Ok(SchemaVariant::Extended),
            _ => Err(Error::Config(format!("unknown schema variant: {}", s))),
        }
    }
}

impl std::fmt::Display for SchemaVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

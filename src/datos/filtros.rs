use serde_json::{Map, Value};

pub const CAMPO_RANGO: &str = "fecha_inicio";

#[derive(Debug, Clone, PartialEq)]
pub enum CondicionFiltro {
    Igual(Value),
    Patron(String),
    UnoDe(Vec<Value>),
    Desde(Value),
    Hasta(Value),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filtros {
    condiciones: Vec<(String, CondicionFiltro)>,
}

fn es_vacio(valor: &Value) -> bool {
    match valor {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        _ => false,
    }
}

impl Filtros {
    pub fn nuevo() -> Self {
        Filtros::default()
    }

    /// Interpreta cada par campo/valor:
    /// - `null`, `""` o `[]` se ignoran
    /// - una lista es "uno de"
    /// - un texto con `%` es un patrón
    /// - `desde`/`hasta` acotan `fecha_inicio`
    /// - cualquier otro valor es igualdad
    pub fn desde_json(objeto: &Map<String, Value>) -> Self {
        let mut filtros = Filtros::nuevo();
        for (campo, valor) in objeto {
            filtros = filtros.agregar(campo, valor.clone());
        }
        filtros
    }

    pub fn agregar(mut self, campo: &str, valor: Value) -> Self {
        if es_vacio(&valor) {
            return self;
        }
        let condicion = match (campo, valor) {
            ("desde", v) => {
                self.condiciones.push((CAMPO_RANGO.to_string(), CondicionFiltro::Desde(v)));
                return self;
            }
            ("hasta", v) => {
                self.condiciones.push((CAMPO_RANGO.to_string(), CondicionFiltro::Hasta(v)));
                return self;
            }
            (_, Value::Array(lista)) => CondicionFiltro::UnoDe(lista),
            (_, Value::String(s)) if s.contains('%') => CondicionFiltro::Patron(s),
            (_, v) => CondicionFiltro::Igual(v),
        };
        self.condiciones.push((campo.to_string(), condicion));
        self
    }

    pub fn con(mut self, campo: &str, condicion: CondicionFiltro) -> Self {
        self.condiciones.push((campo.to_string(), condicion));
        self
    }

    pub fn condiciones(&self) -> &[(String, CondicionFiltro)] {
        &self.condiciones
    }

    pub fn is_empty(&self) -> bool {
        self.condiciones.is_empty()
    }
}

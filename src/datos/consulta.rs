use serde_json::Value;

use crate::datos::esquema::Recurso;
use crate::datos::filtros::{CondicionFiltro, Filtros};
use crate::error::ErrorDatos;

pub const FUNCION_PLEGAR: &str = "plegar";

// postgres no trae una función equivalente sin la extensión unaccent
const CON_TILDE: &str = "áàâäéèêëíìîïóòôöúùûüñç";
const SIN_TILDE: &str = "aaaaeeeeiiiioooouuuunc";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialecto {
    Sqlite,
    Postgres,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direccion {
    #[default]
    Asc,
    Desc,
}

impl Direccion {
    pub fn desde_texto(s: &str) -> Direccion {
        if s.trim().eq_ignore_ascii_case("desc") { Direccion::Desc } else { Direccion::Asc }
    }

    fn sql(&self) -> &'static str {
        match self {
            Direccion::Asc => "ASC",
            Direccion::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Orden {
    pub campo: String,
    pub direccion: Direccion,
}

impl Orden {
    pub fn asc(campo: &str) -> Self {
        Orden { campo: campo.to_string(), direccion: Direccion::Asc }
    }

    pub fn desc(campo: &str) -> Self {
        Orden { campo: campo.to_string(), direccion: Direccion::Desc }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Busqueda {
    pub termino: String,
    pub campos: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rango {
    pub desde: usize,
    pub limite: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sentencia {
    pub sql: String,
    pub params: Vec<Value>,
}

pub fn sanear_termino(termino: &str) -> String {
    termino
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .trim()
        .to_string()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Consulta {
    pub recurso: Recurso,
    pub campos: Vec<String>,
    pub filtros: Filtros,
    pub busqueda: Option<Busqueda>,
    pub orden: Vec<Orden>,
    pub rango: Option<Rango>,
}

struct Armado<'a> {
    dialecto: Dialecto,
    recurso: Recurso,
    params: &'a mut Vec<Value>,
}

impl Armado<'_> {
    fn marcador(&mut self, valor: Value) -> String {
        self.params.push(valor);
        match self.dialecto {
            Dialecto::Sqlite => format!("?{}", self.params.len()),
            Dialecto::Postgres => format!("${}", self.params.len()),
        }
    }

    // en postgres las columnas se comparan como texto: los parámetros viajan como texto
    fn columna(&self, campo: &str) -> String {
        match self.dialecto {
            Dialecto::Sqlite => campo.to_string(),
            Dialecto::Postgres => format!("{}::text", campo),
        }
    }

    // los patrones se comparan sin mayúsculas ni tildes en ambos motores
    fn plegado(&self, expr: &str) -> String {
        match self.dialecto {
            Dialecto::Sqlite => format!("{}({})", FUNCION_PLEGAR, expr),
            Dialecto::Postgres => format!("translate(lower({}), '{}', '{}')", expr, CON_TILDE, SIN_TILDE),
        }
    }

    fn condicion(&mut self, campo: &str, condicion: &CondicionFiltro) -> Result<String, ErrorDatos> {
        let campo = self.recurso.validar_campo(campo)?;
        let col = self.columna(campo);
        let sql = match condicion {
            CondicionFiltro::Igual(v) => format!("{} = {}", col, self.marcador(v.clone())),
            CondicionFiltro::Patron(p) => {
                let m = self.marcador(Value::String(p.clone()));
                format!("{} LIKE {}", self.plegado(&col), self.plegado(&m))
            }
            CondicionFiltro::UnoDe(lista) => {
                let marcadores: Vec<String> = lista.iter().map(|v| self.marcador(v.clone())).collect();
                format!("{} IN ({})", col, marcadores.join(", "))
            }
            CondicionFiltro::Desde(v) => format!("{} >= {}", col, self.marcador(v.clone())),
            CondicionFiltro::Hasta(v) => format!("{} <= {}", col, self.marcador(v.clone())),
        };
        Ok(sql)
    }

    fn where_(&mut self, filtros: &Filtros, busqueda: Option<&Busqueda>) -> Result<String, ErrorDatos> {
        let mut partes = Vec::new();
        for (campo, condicion) in filtros.condiciones() {
            partes.push(self.condicion(campo, condicion)?);
        }
        if let Some(b) = busqueda {
            let termino = sanear_termino(&b.termino);
            if !termino.is_empty() && !b.campos.is_empty() {
                let mut columnas = Vec::with_capacity(b.campos.len());
                for c in &b.campos {
                    columnas.push(self.columna(self.recurso.validar_campo(c)?));
                }
                let m = self.marcador(Value::String(format!("%{}%", termino)));
                let patron = self.plegado(&m);
                let ors: Vec<String> = columnas.iter().map(|c| format!("{} LIKE {}", self.plegado(c), patron)).collect();
                partes.push(format!("({})", ors.join(" OR ")));
            }
        }
        if partes.is_empty() {
            Ok(String::new())
        } else {
            Ok(format!(" WHERE {}", partes.join(" AND ")))
        }
    }
}

impl Consulta {
    pub fn nueva(recurso: Recurso) -> Self {
        Consulta {
            recurso,
            campos: Vec::new(),
            filtros: Filtros::default(),
            busqueda: None,
            orden: Vec::new(),
            rango: None,
        }
    }

    pub fn proyeccion(&self) -> Result<Vec<&str>, ErrorDatos> {
        if self.campos.is_empty() {
            return Ok(self.recurso.columnas().to_vec());
        }
        let mut cols: Vec<&str> = vec!["id", "created_at"];
        for c in &self.campos {
            let c = self.recurso.validar_campo(c)?;
            if !cols.contains(&c) {
                cols.push(c);
            }
        }
        Ok(cols)
    }

    pub fn select(&self, dialecto: Dialecto) -> Result<Sentencia, ErrorDatos> {
        let tabla = self.recurso.tabla();
        let cols = self.proyeccion()?;
        let seleccion = match dialecto {
            Dialecto::Sqlite => cols.join(", "),
            Dialecto::Postgres if self.campos.is_empty() => format!("row_to_json({})::text", tabla),
            Dialecto::Postgres => {
                let pares: Vec<String> = cols.iter().map(|c| format!("'{}', {}", c, c)).collect();
                format!("json_build_object({})::text", pares.join(", "))
            }
        };

        let mut params = Vec::new();
        let filtro = Armado { dialecto, recurso: self.recurso, params: &mut params }
            .where_(&self.filtros, self.busqueda.as_ref())?;

        let mut sql = format!("SELECT {} FROM {}{}", seleccion, tabla, filtro);
        if !self.orden.is_empty() {
            let mut partes = Vec::with_capacity(self.orden.len());
            for o in &self.orden {
                partes.push(format!("{} {}", self.recurso.validar_campo(&o.campo)?, o.direccion.sql()));
            }
            sql.push_str(" ORDER BY ");
            sql.push_str(&partes.join(", "));
        }
        if let Some(r) = self.rango {
            sql.push_str(&format!(" LIMIT {} OFFSET {}", r.limite, r.desde));
        }
        Ok(Sentencia { sql, params })
    }

    /// `SELECT COUNT(*)` con los mismos filtros y búsqueda; ignora orden y rango.
    pub fn contar(&self, dialecto: Dialecto) -> Result<Sentencia, ErrorDatos> {
        let mut params = Vec::new();
        let filtro = Armado { dialecto, recurso: self.recurso, params: &mut params }
            .where_(&self.filtros, self.busqueda.as_ref())?;
        Ok(Sentencia { sql: format!("SELECT COUNT(*) FROM {}{}", self.recurso.tabla(), filtro), params })
    }
}

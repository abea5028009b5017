use chrono::{SecondsFormat, Utc};
use rusqlite::functions::FunctionFlags;
use rusqlite::types::{Value as ValorSql, ValueRef};
use rusqlite::{params_from_iter, Connection, Row};
use serde_json::{Number, Value};

use crate::datos::consulta::{Consulta, Dialecto, FUNCION_PLEGAR};
use crate::datos::esquema::Recurso;
use crate::datos::Registro;
use crate::error::ErrorDatos;
use crate::models::texto::plegar;

pub fn ahora_texto() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn valor_a_sql(valor: &Value) -> ValorSql {
    match valor {
        Value::Null => ValorSql::Null,
        Value::Bool(b) => ValorSql::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => ValorSql::Integer(i),
            None => ValorSql::Real(n.as_f64().unwrap_or(0.0)),
        },
        Value::String(s) => ValorSql::Text(s.clone()),
        // listas y objetos se guardan como JSON
        otro => ValorSql::Text(otro.to_string()),
    }
}

fn valor_desde_sql(valor: ValueRef<'_>) -> Value {
    match valor {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::String(String::from_utf8_lossy(b).into_owned()),
    }
}

fn fila_a_registro(fila: &Row<'_>, columnas: &[String]) -> Result<Registro, ErrorDatos> {
    let mut registro = Registro::new();
    for (i, nombre) in columnas.iter().enumerate() {
        registro.insert(nombre.clone(), valor_desde_sql(fila.get_ref(i)?));
    }
    Ok(registro)
}

fn ejecutar_select(conn: &Connection, sql: &str, params: Vec<ValorSql>) -> Result<Vec<Registro>, ErrorDatos> {
    let mut stmt = conn.prepare(sql)?;
    let columnas: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let mut filas = stmt.query(params_from_iter(params))?;
    let mut out = Vec::new();
    while let Some(fila) = filas.next()? {
        out.push(fila_a_registro(fila, &columnas)?);
    }
    Ok(out)
}

// el LIKE de sqlite sólo ignora mayúsculas en ASCII
pub fn registrar_funciones(conn: &Connection) -> Result<(), ErrorDatos> {
    conn.create_scalar_function(
        FUNCION_PLEGAR,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let plegado = match ctx.get_raw(0) {
                ValueRef::Null => None,
                ValueRef::Integer(i) => Some(i.to_string()),
                ValueRef::Real(f) => Some(f.to_string()),
                ValueRef::Text(t) | ValueRef::Blob(t) => Some(plegar(&String::from_utf8_lossy(t))),
            };
            Ok(plegado)
        },
    )?;
    Ok(())
}

pub fn inicializar(conn: &Connection) -> Result<(), ErrorDatos> {
    for recurso in Recurso::TODOS {
        conn.execute(&recurso.ddl_sqlite(), [])?;
    }
    Ok(())
}

pub fn consultar(conn: &Connection, consulta: &Consulta) -> Result<Vec<Registro>, ErrorDatos> {
    let sentencia = consulta.select(Dialecto::Sqlite)?;
    let params = sentencia.params.iter().map(valor_a_sql).collect();
    ejecutar_select(conn, &sentencia.sql, params)
}

pub fn contar(conn: &Connection, consulta: &Consulta) -> Result<usize, ErrorDatos> {
    let sentencia = consulta.contar(Dialecto::Sqlite)?;
    let params: Vec<ValorSql> = sentencia.params.iter().map(valor_a_sql).collect();
    let n: i64 = conn.query_row(&sentencia.sql, params_from_iter(params), |r| r.get(0))?;
    Ok(usize::try_from(n).unwrap_or(0))
}

pub fn actualizar(conn: &Connection, recurso: Recurso, id: &str, cambios: &Registro) -> Result<Registro, ErrorDatos> {
    let mut asignaciones = Vec::new();
    let mut params = Vec::new();
    for (campo, valor) in cambios {
        let campo = recurso.validar_campo(campo)?;
        if campo == "id" || campo == "created_at" {
            continue;
        }
        params.push(valor_a_sql(valor));
        asignaciones.push(format!("{} = ?{}", campo, params.len()));
    }
    if !cambios.contains_key("updated_at") {
        params.push(ValorSql::Text(ahora_texto()));
        asignaciones.push(format!("updated_at = ?{}", params.len()));
    }
    params.push(ValorSql::Text(id.to_string()));
    let sql = format!(
        "UPDATE {} SET {} WHERE id = ?{} RETURNING *",
        recurso.tabla(),
        asignaciones.join(", "),
        params.len()
    );
    ejecutar_select(conn, &sql, params)?
        .into_iter()
        .next()
        .ok_or_else(|| ErrorDatos::ActualizacionParcial { recurso: recurso.tabla().to_string(), id: id.to_string() })
}

pub fn crear(conn: &Connection, recurso: Recurso, campos: &Registro) -> Result<Registro, ErrorDatos> {
    let mut columnas = Vec::new();
    let mut params = Vec::new();
    for (campo, valor) in campos {
        let campo = recurso.validar_campo(campo)?;
        // un id o created_at nulo dejaría la fila sin sus valores por defecto
        if valor.is_null() && (campo == "id" || campo == "created_at") {
            continue;
        }
        columnas.push(campo);
        params.push(valor_a_sql(valor));
    }
    let sql = if columnas.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES RETURNING *", recurso.tabla())
    } else {
        let marcadores: Vec<String> = (1..=params.len()).map(|i| format!("?{}", i)).collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING *",
            recurso.tabla(),
            columnas.join(", "),
            marcadores.join(", ")
        )
    };
    ejecutar_select(conn, &sql, params)?
        .into_iter()
        .next()
        .ok_or_else(|| ErrorDatos::Creacion { recurso: recurso.tabla().to_string() })
}

pub fn eliminar(conn: &Connection, recurso: Recurso, id: &str) -> Result<(), ErrorDatos> {
    let sql = format!("DELETE FROM {} WHERE id = ?1", recurso.tabla());
    let borradas = conn.execute(&sql, [id])?;
    if borradas == 0 {
        return Err(ErrorDatos::Eliminacion { recurso: recurso.tabla().to_string(), id: id.to_string() });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn conn() -> Connection {
        let c = Connection::open_in_memory().unwrap();
        registrar_funciones(&c).unwrap();
        inicializar(&c).unwrap();
        c
    }

    #[test]
    fn test_crear_asigna_id_y_created_at() {
        let c = conn();
        let campos = json!({"nombre": "Hospital Central", "telefono": "555"});
        let r = crear(&c, Recurso::Instituciones, campos.as_object().unwrap()).unwrap();
        assert_eq!(r["nombre"], "Hospital Central");
        assert!(r["id"].as_str().is_some_and(|s| s.len() == 32));
        assert!(r["created_at"].as_str().is_some_and(|s| s.ends_with('Z')));
    }

    #[test]
    fn test_actualizar_fija_updated_at() {
        let c = conn();
        let creado = crear(&c, Recurso::Instituciones, json!({"nombre": "A"}).as_object().unwrap()).unwrap();
        let id = creado["id"].as_str().unwrap().to_string();
        let r = actualizar(&c, Recurso::Instituciones, &id, json!({"telefono": "123"}).as_object().unwrap()).unwrap();
        assert_eq!(r["telefono"], "123");
        assert!(r["updated_at"].is_string());
    }

    #[test]
    fn test_plegar_en_sql() {
        let c = conn();
        let r: String = c.query_row("SELECT plegar('CLÍNICA Ñandú')", [], |f| f.get(0)).unwrap();
        assert_eq!(r, "clinica nandu");
        let nulo: Option<String> = c.query_row("SELECT plegar(NULL)", [], |f| f.get(0)).unwrap();
        assert_eq!(nulo, None);
    }

    #[test]
    fn test_valor_a_sql() {
        assert_eq!(valor_a_sql(&json!(true)), ValorSql::Integer(1));
        assert_eq!(valor_a_sql(&json!(2.5)), ValorSql::Real(2.5));
        assert_eq!(valor_a_sql(&json!(["a"])), ValorSql::Text("[\"a\"]".to_string()));
    }
}

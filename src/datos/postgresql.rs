// Cada operación conecta en su propio hilo: el cliente síncrono levanta su
// propio runtime y no puede correr dentro del de actix. Las filas viajan como
// JSON y los parámetros como texto (columnas comparadas como ::text).

use postgres::types::ToSql;
use postgres::{Client, NoTls};
use serde_json::Value;

use crate::datos::consulta::{Consulta, Dialecto, Sentencia};
use crate::datos::esquema::Recurso;
use crate::datos::Registro;
use crate::error::ErrorDatos;

fn en_hilo<T, F>(url: &str, operacion: F) -> Result<T, ErrorDatos>
where
    T: Send + 'static,
    F: FnOnce(&mut Client) -> Result<T, ErrorDatos> + Send + 'static,
{
    let url = url.to_string();
    let handle = std::thread::spawn(move || -> Result<T, ErrorDatos> {
        let mut client = Client::connect(&url, NoTls)?;
        operacion(&mut client)
    });
    match handle.join() {
        Ok(r) => r,
        Err(e) => Err(ErrorDatos::Hilo(format!("{:?}", e))),
    }
}

pub fn valor_a_texto(valor: &Value) -> Option<String> {
    match valor {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        otro => Some(otro.to_string()),
    }
}

fn consultar_json(client: &mut Client, sql: &str, params: &[Option<String>]) -> Result<Vec<Registro>, ErrorDatos> {
    let refs: Vec<&(dyn ToSql + Sync)> = params.iter().map(|p| p as &(dyn ToSql + Sync)).collect();
    let filas = client.query(sql, &refs)?;
    let mut out = Vec::with_capacity(filas.len());
    for fila in filas.iter() {
        let texto: String = fila.try_get(0)?;
        out.push(serde_json::from_str::<Registro>(&texto)?);
    }
    Ok(out)
}

fn textos(sentencia: &Sentencia) -> Vec<Option<String>> {
    sentencia.params.iter().map(valor_a_texto).collect()
}

pub fn inicializar(url: &str) -> Result<(), ErrorDatos> {
    en_hilo(url, |client| {
        let ddl: Vec<String> = Recurso::TODOS.iter().map(|r| r.ddl_postgres()).collect();
        client.batch_execute(&ddl.join("\n"))?;
        Ok(())
    })
}

pub fn consultar(url: &str, consulta: &Consulta) -> Result<Vec<Registro>, ErrorDatos> {
    let sentencia = consulta.select(Dialecto::Postgres)?;
    let params = textos(&sentencia);
    en_hilo(url, move |client| consultar_json(client, &sentencia.sql, &params))
}

pub fn contar(url: &str, consulta: &Consulta) -> Result<usize, ErrorDatos> {
    let sentencia = consulta.contar(Dialecto::Postgres)?;
    let params = textos(&sentencia);
    en_hilo(url, move |client| {
        let refs: Vec<&(dyn ToSql + Sync)> = params.iter().map(|p| p as &(dyn ToSql + Sync)).collect();
        let fila = client.query_one(sentencia.sql.as_str(), &refs)?;
        let n: i64 = fila.try_get(0)?;
        Ok(usize::try_from(n).unwrap_or(0))
    })
}

pub fn actualizar(url: &str, recurso: Recurso, id: &str, cambios: &Registro) -> Result<Registro, ErrorDatos> {
    let mut asignaciones = Vec::new();
    for campo in cambios.keys() {
        let campo = recurso.validar_campo(campo)?;
        if campo == "id" || campo == "created_at" {
            continue;
        }
        asignaciones.push(format!("{} = p.{}", campo, campo));
    }
    if !cambios.contains_key("updated_at") {
        asignaciones.push("updated_at = now()".to_string());
    }
    let tabla = recurso.tabla();
    let sql = format!(
        "UPDATE {t} AS r SET {a} FROM json_populate_record(NULL::{t}, $1::text::json) AS p \
         WHERE r.id::text = $2 RETURNING row_to_json(r)::text",
        t = tabla,
        a = asignaciones.join(", ")
    );
    let cuerpo = serde_json::to_string(cambios)?;
    let id_s = id.to_string();
    let filas = en_hilo(url, move |client| consultar_json(client, &sql, &[Some(cuerpo), Some(id_s)]))?;
    filas
        .into_iter()
        .next()
        .ok_or_else(|| ErrorDatos::ActualizacionParcial { recurso: tabla.to_string(), id: id.to_string() })
}

pub fn crear(url: &str, recurso: Recurso, campos: &Registro) -> Result<Registro, ErrorDatos> {
    let mut columnas = Vec::new();
    for (campo, valor) in campos {
        let campo = recurso.validar_campo(campo)?;
        if valor.is_null() && (campo == "id" || campo == "created_at") {
            continue;
        }
        columnas.push(campo);
    }
    let tabla = recurso.tabla();
    let (sql, params) = if columnas.is_empty() {
        (format!("INSERT INTO {t} AS r DEFAULT VALUES RETURNING row_to_json(r)::text", t = tabla), Vec::new())
    } else {
        let cols = columnas.join(", ");
        (
            format!(
                "INSERT INTO {t} AS r ({c}) SELECT {c} FROM json_populate_record(NULL::{t}, $1::text::json) \
                 RETURNING row_to_json(r)::text",
                t = tabla,
                c = cols
            ),
            vec![Some(serde_json::to_string(campos)?)],
        )
    };
    let filas = en_hilo(url, move |client| consultar_json(client, &sql, &params))?;
    filas
        .into_iter()
        .next()
        .ok_or_else(|| ErrorDatos::Creacion { recurso: tabla.to_string() })
}

pub fn eliminar(url: &str, recurso: Recurso, id: &str) -> Result<(), ErrorDatos> {
    let sql = format!("DELETE FROM {} WHERE id::text = $1", recurso.tabla());
    let id_s = id.to_string();
    let borradas = en_hilo(url, move |client| Ok(client.execute(sql.as_str(), &[&id_s])?))?;
    if borradas == 0 {
        return Err(ErrorDatos::Eliminacion { recurso: recurso.tabla().to_string(), id: id.to_string() });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valor_a_texto() {
        assert_eq!(valor_a_texto(&json!(null)), None);
        assert_eq!(valor_a_texto(&json!("x")), Some("x".to_string()));
        assert_eq!(valor_a_texto(&json!(12)), Some("12".to_string()));
        assert_eq!(valor_a_texto(&json!(false)), Some("false".to_string()));
    }
}

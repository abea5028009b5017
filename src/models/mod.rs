// Estructuras de datos principales

pub mod fechas;
pub mod texto;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Estado de gestión de un lanzamiento.
///
/// El texto libre de la base de datos se interpreta una sola vez, al leer el
/// registro; el resto del crate compara variantes, no cadenas.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum EstadoGestion {
    PendienteDeGestion,
    EsperandoRespuesta,
    EnConversacion,
    SeguimientoExhaustivo,
    RelanzamientoConfirmado,
    Relanzada,
    Archivado,
    NoSeRelanza,
    /// Texto no reconocido, conservado tal cual.
    Otro(String),
    #[default]
    SinEstado,
}

impl EstadoGestion {
    pub fn desde_texto(valor: Option<&str>) -> Self {
        let original = match valor {
            Some(t) if !t.trim().is_empty() => t,
            _ => return EstadoGestion::SinEstado,
        };
        match texto::normalizar(original).as_str() {
            "pendiente de gestion" => EstadoGestion::PendienteDeGestion,
            "esperando respuesta" => EstadoGestion::EsperandoRespuesta,
            "en conversacion" => EstadoGestion::EnConversacion,
            "seguimiento exhaustivo" => EstadoGestion::SeguimientoExhaustivo,
            "relanzamiento confirmado" => EstadoGestion::RelanzamientoConfirmado,
            "relanzada" => EstadoGestion::Relanzada,
            "archivado" => EstadoGestion::Archivado,
            "no se relanza" => EstadoGestion::NoSeRelanza,
            _ => EstadoGestion::Otro(original.trim().to_string()),
        }
    }

    /// Etiqueta canónica, tal como la escriben los administradores.
    pub fn etiqueta(&self) -> &str {
        match self {
            EstadoGestion::PendienteDeGestion => "Pendiente de Gestión",
            EstadoGestion::EsperandoRespuesta => "Esperando Respuesta",
            EstadoGestion::EnConversacion => "En Conversación",
            EstadoGestion::SeguimientoExhaustivo => "Seguimiento Exhaustivo",
            EstadoGestion::RelanzamientoConfirmado => "Relanzamiento Confirmado",
            EstadoGestion::Relanzada => "Relanzada",
            EstadoGestion::Archivado => "Archivado",
            EstadoGestion::NoSeRelanza => "No se Relanza",
            EstadoGestion::Otro(s) => s.as_str(),
            EstadoGestion::SinEstado => "",
        }
    }

    /// Archivado o explícitamente descartado: nunca representa a su grupo.
    pub fn es_excluido(&self) -> bool {
        matches!(self, EstadoGestion::Archivado | EstadoGestion::NoSeRelanza)
    }

    pub fn es_relanzamiento(&self) -> bool {
        matches!(self, EstadoGestion::RelanzamientoConfirmado | EstadoGestion::Relanzada)
    }
}

impl From<Option<String>> for EstadoGestion {
    fn from(valor: Option<String>) -> Self {
        EstadoGestion::desde_texto(valor.as_deref())
    }
}

impl From<EstadoGestion> for Option<String> {
    fn from(estado: EstadoGestion) -> Self {
        match estado {
            EstadoGestion::SinEstado => None,
            otro => Some(otro.etiqueta().to_string()),
        }
    }
}

/// Lanzamiento de una convocatoria PPS, ya interpretado desde la base de datos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lanzamiento {
    pub id: String,
    /// Convención: "<Institución> - <Variante>"
    pub nombre: Option<String>,
    #[serde(default)]
    pub estado_gestion: EstadoGestion,
    pub fecha_inicio: Option<NaiveDate>,
    pub fecha_fin: Option<NaiveDate>,
    pub fecha_relanzamiento: Option<NaiveDate>,
    /// Lista separada por comas (p. ej. "Clínica, Educacional")
    pub orientacion: Option<String>,
    pub notas_gestion: Option<String>,
    pub actualizado: Option<DateTime<Utc>>,
    pub creado: Option<DateTime<Utc>>,
}

impl Lanzamiento {
    /// Lanzamiento vacío con el id dado; útil para construir registros a mano.
    pub fn nuevo(id: impl Into<String>, nombre: impl Into<String>) -> Self {
        Lanzamiento {
            id: id.into(),
            nombre: Some(nombre.into()),
            estado_gestion: EstadoGestion::SinEstado,
            fecha_inicio: None,
            fecha_fin: None,
            fecha_relanzamiento: None,
            orientacion: None,
            notas_gestion: None,
            actualizado: None,
            creado: None,
        }
    }

    /// Última actividad de gestión conocida: actualización, creación o `ahora`.
    pub fn ultima_actividad(&self, ahora: DateTime<Utc>) -> DateTime<Utc> {
        self.actualizado.or(self.creado).unwrap_or(ahora)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Institucion {
    pub id: String,
    pub nombre: String,
    pub telefono: Option<String>,
}

/// Datos de contacto adjuntados a una entrada clasificada.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactoInstitucion {
    pub id: String,
    pub nombre: String,
    pub telefono: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Urgencia {
    #[serde(rename = "high")]
    Alta,
    #[serde(rename = "normal")]
    Normal,
}

/// Lanzamiento representativo de un grupo, con los campos calculados según
/// la bandeja en la que cayó.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntradaClasificada {
    pub lanzamiento: Lanzamiento,
    /// Clave del grupo (institución) al que pertenece
    pub grupo: String,
    #[serde(rename = "daysSinceEnd", skip_serializing_if = "Option::is_none")]
    pub dias_desde_fin: Option<i64>,
    #[serde(rename = "daysWaiting", skip_serializing_if = "Option::is_none")]
    pub dias_esperando: Option<i64>,
    #[serde(rename = "daysSinceResponse", skip_serializing_if = "Option::is_none")]
    pub dias_desde_respuesta: Option<i64>,
    #[serde(rename = "daysLeft", skip_serializing_if = "Option::is_none")]
    pub dias_restantes: Option<i64>,
    #[serde(rename = "urgency", skip_serializing_if = "Option::is_none")]
    pub urgencia: Option<Urgencia>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institucion: Option<ContactoInstitucion>,
}

impl EntradaClasificada {
    pub fn nueva(lanzamiento: Lanzamiento, grupo: impl Into<String>) -> Self {
        EntradaClasificada {
            lanzamiento,
            grupo: grupo.into(),
            dias_desde_fin: None,
            dias_esperando: None,
            dias_desde_respuesta: None,
            dias_restantes: None,
            urgencia: None,
            institucion: None,
        }
    }
}

/// Proyección de los lanzamientos en seis bandejas del ciclo de vida.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultadoClasificacion {
    pub por_contactar: Vec<EntradaClasificada>,
    pub contactadas_esperando_respuesta: Vec<EntradaClasificada>,
    pub respondidas_pendiente_decision: Vec<EntradaClasificada>,
    pub relanzamientos_confirmados: Vec<EntradaClasificada>,
    pub activas_y_por_finalizar: Vec<EntradaClasificada>,
    pub activas_indefinidas: Vec<EntradaClasificada>,
}

/// Conteo por bandeja
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumenClasificacion {
    pub por_contactar: usize,
    pub contactadas_esperando_respuesta: usize,
    pub respondidas_pendiente_decision: usize,
    pub relanzamientos_confirmados: usize,
    pub activas_y_por_finalizar: usize,
    pub activas_indefinidas: usize,
    pub total: usize,
}

impl ResultadoClasificacion {
    pub fn resumen(&self) -> ResumenClasificacion {
        let mut r = ResumenClasificacion {
            por_contactar: self.por_contactar.len(),
            contactadas_esperando_respuesta: self.contactadas_esperando_respuesta.len(),
            respondidas_pendiente_decision: self.respondidas_pendiente_decision.len(),
            relanzamientos_confirmados: self.relanzamientos_confirmados.len(),
            activas_y_por_finalizar: self.activas_y_por_finalizar.len(),
            activas_indefinidas: self.activas_indefinidas.len(),
            total: 0,
        };
        r.total = r.por_contactar
            + r.contactadas_esperando_respuesta
            + r.respondidas_pendiente_decision
            + r.relanzamientos_confirmados
            + r.activas_y_por_finalizar
            + r.activas_indefinidas;
        r
    }

    /// Todas las entradas, bandeja por bandeja en el orden de declaración.
    pub fn entradas(&self) -> impl Iterator<Item = &EntradaClasificada> {
        self.por_contactar
            .iter()
            .chain(self.contactadas_esperando_respuesta.iter())
            .chain(self.respondidas_pendiente_decision.iter())
            .chain(self.relanzamientos_confirmados.iter())
            .chain(self.activas_y_por_finalizar.iter())
            .chain(self.activas_indefinidas.iter())
    }

    pub fn entradas_mut(&mut self) -> impl Iterator<Item = &mut EntradaClasificada> {
        self.por_contactar
            .iter_mut()
            .chain(self.contactadas_esperando_respuesta.iter_mut())
            .chain(self.respondidas_pendiente_decision.iter_mut())
            .chain(self.relanzamientos_confirmados.iter_mut())
            .chain(self.activas_y_por_finalizar.iter_mut())
            .chain(self.activas_indefinidas.iter_mut())
    }
}

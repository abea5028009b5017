// Filtro por nombre/orientación y debounce del término de búsqueda

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::gestion::OpcionesClasificacion;
use crate::models::texto::{contiene_normalizado, normalizar};
use crate::models::Lanzamiento;

fn coincide_orientacion(lanzamiento: &Lanzamiento, orientaciones: &[String]) -> bool {
    let Some(valor) = lanzamiento.orientacion.as_deref() else {
        return false;
    };
    valor
        .split(',')
        .map(normalizar)
        .filter(|o| !o.is_empty())
        .any(|o| orientaciones.iter().any(|buscada| *buscada == o))
}

pub fn filtrar<'a>(registros: &'a [Lanzamiento], opciones: &OpcionesClasificacion) -> Vec<&'a Lanzamiento> {
    let termino = opciones
        .busqueda
        .as_deref()
        .map(normalizar)
        .filter(|t| !t.is_empty());
    let orientaciones: Vec<String> = opciones
        .orientaciones
        .iter()
        .map(|o| normalizar(o))
        .filter(|o| !o.is_empty())
        .collect();

    registros
        .iter()
        .filter(|l| match &termino {
            Some(t) => contiene_normalizado(l.nombre.as_deref().unwrap_or(""), t),
            None => true,
        })
        .filter(|l| orientaciones.is_empty() || coincide_orientacion(l, &orientaciones))
        .collect()
}

/// Retrasa la entrega de un valor hasta que pasa `retardo` sin cambios.
///
/// Cada `programar` cancela el temporizador pendiente, así que de una ráfaga
/// de cambios sólo llega el último al receptor.
pub struct Debouncer<T> {
    retardo: Duration,
    tx: Arc<watch::Sender<Option<T>>>,
    pendiente: Option<JoinHandle<()>>,
}

impl<T> Debouncer<T>
where
    T: Send + Sync + 'static,
{
    pub fn nuevo(retardo: Duration) -> (Self, watch::Receiver<Option<T>>) {
        let (tx, rx) = watch::channel(None);
        let debouncer = Debouncer { retardo, tx: Arc::new(tx), pendiente: None };
        (debouncer, rx)
    }

    /// Usa el retardo de `GESTION_DEBOUNCE_MS`.
    pub fn desde_config(config: &Config) -> (Self, watch::Receiver<Option<T>>) {
        Debouncer::nuevo(config.debounce)
    }

    pub fn retardo(&self) -> Duration {
        self.retardo
    }

    /// Programa la entrega de `valor`. Debe llamarse dentro de un runtime tokio.
    pub fn programar(&mut self, valor: T) {
        self.cancelar();
        let tx = Arc::clone(&self.tx);
        let retardo = self.retardo;
        self.pendiente = Some(tokio::spawn(async move {
            tokio::time::sleep(retardo).await;
            tx.send_replace(Some(valor));
        }));
    }

    pub fn cancelar(&mut self) {
        if let Some(tarea) = self.pendiente.take() {
            tarea.abort();
        }
    }

    pub fn hay_pendiente(&self) -> bool {
        self.pendiente.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(tarea) = self.pendiente.take() {
            tarea.abort();
        }
    }
}

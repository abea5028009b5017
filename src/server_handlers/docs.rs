use actix_web::{HttpResponse, Responder};
use serde_json::json;

pub async fn help_handler() -> impl Responder {
    let help = json!({
        "description": "API de gestión de lanzamientos PPS. GET /gestion clasifica los lanzamientos en bandejas (por contactar, esperando respuesta, en conversación, relanzamientos confirmados, activas, sin fechas).",
        "endpoints": {
            "GET /gestion": "bandejas + resumen; query: busqueda, orientaciones (lista separada por comas), filtro (todas | vencidas | proximas)",
            "GET /gestion/resumen": "sólo los conteos por bandeja",
            "GET /lanzamientos": "tabla paginada; query: pagina, tamano, busqueda, orden, direccion (asc|desc), filtros (objeto JSON)",
            "POST /lanzamientos": "crea un lanzamiento con los campos del cuerpo",
            "PATCH /lanzamientos": "actualiza varios: [{\"id\": ..., \"campos\": {...}}]",
            "PATCH /lanzamientos/{id}": "actualiza los campos presentes en el cuerpo",
            "DELETE /lanzamientos/{id}": "elimina el lanzamiento",
            "GET /instituciones": "lista de instituciones con teléfono",
            "PATCH /instituciones/{id}/telefono": "cuerpo {\"telefono\": \"...\"}"
        },
        "patch_example": {"estado_gestion": "Esperando Respuesta", "notas_gestion": "Se envió correo el lunes"},
        "get_example_query": "/lanzamientos?pagina=2&tamano=20&busqueda=norte&orden=fecha_inicio&direccion=desc&filtros=%7B%22estado_gestion%22%3A%22Archivado%22%7D",
        "estados": [
            "Pendiente de Gestión",
            "Esperando Respuesta",
            "En Conversación",
            "Seguimiento Exhaustivo",
            "Relanzamiento Confirmado",
            "Relanzada",
            "Archivado",
            "No se Relanza"
        ],
        "error_format": {"error": {"type": "PARTIAL_UPDATE", "message": "..."}}
    });

    HttpResponse::Ok().json(help)
}

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Pasa a minúsculas, recorta espacios y elimina las marcas diacríticas
/// (descomposición NFD). "  Pendiente de Gestión " -> "pendiente de gestion".
pub fn normalizar(texto: &str) -> String {
    plegar(texto.trim())
}

// igual que `normalizar` pero sin recortar; los comodines de LIKE quedan intactos
pub fn plegar(texto: &str) -> String {
    texto.to_lowercase().nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// `true` si `texto` contiene `termino` una vez normalizados ambos.
/// `termino` se asume ya normalizado.
pub fn contiene_normalizado(texto: &str, termino_normalizado: &str) -> bool {
    normalizar(texto).contains(termino_normalizado)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizar_quita_tildes_y_mayusculas() {
        assert_eq!(normalizar("  Pendiente de Gestión "), "pendiente de gestion");
        assert_eq!(normalizar("En Conversación"), "en conversacion");
        assert_eq!(normalizar("Turno Mañana"), "turno manana");
        assert_eq!(normalizar(""), "");
    }

    #[test]
    fn test_plegar_conserva_espacios_y_comodines() {
        assert_eq!(plegar("%CLÍNICA %"), "%clinica %");
        assert_eq!(plegar(" Ñandú_"), " nandu_");
    }

    #[test]
    fn test_contiene_normalizado() {
        assert!(contiene_normalizado("Colegio Norte - A", "norte"));
        assert!(contiene_normalizado("Clínica San José", "clinica san jose"));
        assert!(!contiene_normalizado("Colegio Sur - B", "norte"));
    }
}

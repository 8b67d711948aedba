use crate::config::Config;
use crate::jobs::JobKind;

/// Steps to create and share a service account, shown when the
/// credentials file is missing.
pub fn setup_instructions(config: &Config) -> String {
    let calendars: Vec<String> = JobKind::ALL
        .iter()
        .filter_map(|kind| kind.target(config).ok())
        .map(|target| format!("\"{}\"", target.calendar_name))
        .collect();
    let calendars = if calendars.is_empty() {
        "cada calendario configurado".to_string()
    } else {
        calendars.join(", ")
    };

    let lines = [
        "🔧 CONFIGURACIÓN DE SERVICE ACCOUNT".to_string(),
        "=".repeat(60),
        String::new(),
        "1️⃣  Ve a Google Cloud Console:".to_string(),
        "   https://console.cloud.google.com/".to_string(),
        String::new(),
        "2️⃣  Crea un nuevo proyecto o selecciona uno existente".to_string(),
        String::new(),
        "3️⃣  Habilita la API de Google Calendar:".to_string(),
        "   https://console.cloud.google.com/apis/library/calendar-json.googleapis.com"
            .to_string(),
        String::new(),
        "4️⃣  Crea un Service Account:".to_string(),
        "   https://console.cloud.google.com/iam-admin/serviceaccounts".to_string(),
        String::new(),
        "5️⃣  Descarga el archivo JSON de credenciales".to_string(),
        String::new(),
        format!(
            "6️⃣  Guárdalo como \"{}\"",
            config.credentials_path.display()
        ),
        String::new(),
        format!("7️⃣  IMPORTANTE: Comparte {} con el email del Service Account", calendars),
        "    (debe tener permisos para hacer cambios en eventos)".to_string(),
        String::new(),
        "8️⃣  Vuelve a ejecutar: calendar-sync".to_string(),
    ];
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_instructions_name_path_and_calendars() {
        let mut config = Config::example();
        config.credentials_path = PathBuf::from("/etc/malbec/sa.json");
        let text = setup_instructions(&config);
        assert!(text.contains("Guárdalo como \"/etc/malbec/sa.json\""));
        assert!(text.contains("\"Live\", \"Management\", \"Booking\", \"Releases\""));
    }
}

//! Prompt templates for the catalog assistant.

use crate::catalog::Catalog;

use super::AssistantMessage;

const PERSONA: &str = "\
Eres \"IA Solutions Assistant\", un experto amigable y servicial para la aplicación \
\"IA Solutions Configurator\". Tu objetivo es ayudar a los usuarios a entender los productos, \
planes y opciones para que puedan construir la solución de IA que necesitan.";

const TASKS: &str = "\
**Tus Tareas:**
1. **Responde Preguntas:** Contesta dudas sobre qué hace cada producto, cuáles son sus precios, qué incluyen los planes, etc.
2. **Guía al Usuario:** Si un usuario no sabe por dónde empezar, puedes sugerirle el \"Plan Profesional\" como un buen punto de partida o preguntarle sobre sus necesidades para recomendarle productos.
3. **Sé Conciso:** Da respuestas claras y al grano. Evita párrafos largos. Usa listas si es necesario.
4. **Mantén el Contexto:** Utiliza el historial de la conversación para entender la pregunta actual.";

/// Prompt with the whole catalog injected as JSON.
pub fn context_prompt(
    catalog: &Catalog,
    history: &[AssistantMessage],
) -> Result<String, serde_json::Error> {
    let products = serde_json::to_string(catalog.categories())?;
    let plans = serde_json::to_string(catalog.plans())?;

    Ok(format!(
        "{PERSONA}\n\n\
         **Tu Contexto:**\n\
         - Productos Disponibles: {products}\n\
         - Planes Pre-diseñados: {plans}\n\n\
         {TASKS}\n\n\
         {}",
        conversation(history)
    ))
}

/// Prompt that points the model at documents instead of injecting data.
pub fn tools_prompt(document_urls: &[String], history: &[AssistantMessage]) -> String {
    let urls = if document_urls.is_empty() {
        "- (ninguno configurado)".to_string()
    } else {
        document_urls
            .iter()
            .map(|url| format!("- {url}"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "{PERSONA}\n\n\
         **Tus Fuentes:**\n\
         La información de productos, precios y planes está en estos documentos:\n\
         {urls}\n\n\
         Usa la herramienta `fetchDocumentContent` con la URL adecuada para leerlos antes de \
         responder. No inventes precios ni características; si la información no está en los \
         documentos, dilo.\n\n\
         {TASKS}\n\n\
         {}",
        conversation(history)
    )
}

fn conversation(history: &[AssistantMessage]) -> String {
    let rendered: String = history
        .iter()
        .map(|msg| format!("**{}**: {}\n", msg.role.as_str(), msg.content))
        .collect();
    let latest = history.last().map(|m| m.content.as_str()).unwrap_or("");

    format!(
        "**Historial de la Conversación:**\n\
         {rendered}\n\
         **Pregunta actual del usuario:**\n\
         {latest}\n\n\
         Responde directamente a la última pregunta del usuario."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history() -> Vec<AssistantMessage> {
        vec![
            AssistantMessage::user("Hola"),
            AssistantMessage::model("¡Hola! ¿En qué te ayudo?"),
            AssistantMessage::user("¿cuánto cuesta el bot de ventas?"),
        ]
    }

    #[test]
    fn context_prompt_injects_catalog_and_history() {
        let prompt = context_prompt(&Catalog::builtin(), &history()).unwrap();
        assert!(prompt.starts_with("Eres \"IA Solutions Assistant\""));
        assert!(prompt.contains("\"id\":\"bot-ventas\""));
        assert!(prompt.contains("\"id\":\"plan-profesional\""));
        assert!(prompt.contains("**model**: ¡Hola! ¿En qué te ayudo?\n"));
        assert!(prompt.contains(
            "**Pregunta actual del usuario:**\n¿cuánto cuesta el bot de ventas?"
        ));
    }

    #[test]
    fn tools_prompt_lists_documents_without_catalog() {
        let urls = vec!["https://docs.google.com/document/d/planes-empresariales".to_string()];
        let prompt = tools_prompt(&urls, &history());
        assert!(prompt.contains("- https://docs.google.com/document/d/planes-empresariales"));
        assert!(prompt.contains("fetchDocumentContent"));
        assert!(!prompt.contains("bot-ventas"));
    }

    #[test]
    fn tools_prompt_without_documents() {
        let prompt = tools_prompt(&[], &history());
        assert!(prompt.contains("(ninguno configurado)"));
    }
}

//! Built-in document source serving the company's two reference documents.

use async_trait::async_trait;

use super::{DocumentRef, DocumentSource};
use crate::error::DocumentError;

const PRODUCTS_DOC: &str = "\
## Nuestros Productos

**Bot de Atención al Cliente ($500/mes):** Responde preguntas frecuentes 24/7.
**Bot de Ventas ($750/mes):** Califica leads y agenda demos.
**Hosting Dedicado (Desde $100/mes):** Infraestructura optimizada para IA.
**Integración Gemini Pro ($1200/mes):** Acceso a la IA más potente de Google.
";

const PLANS_DOC: &str = "\
## Nuestros Planes

**Básico ($550/mes):** Ideal para startups. Incluye Bot de Atención y Hosting Básico.
**Profesional ($1600/mes):** Para empresas en crecimiento. Incluye Bot de Ventas y Analítica.
**Empresarial ($4500/mes):** Potencia máxima con soporte premium e integraciones.
";

/// Matches documents by a fragment of their URL.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleDocumentSource;

impl SampleDocumentSource {
    /// URLs the sample documents are published under.
    pub fn known_urls() -> Vec<String> {
        vec![
            "https://docs.google.com/document/d/productos-y-servicios".to_string(),
            "https://docs.google.com/document/d/planes-empresariales".to_string(),
        ]
    }
}

#[async_trait]
impl DocumentSource for SampleDocumentSource {
    fn name(&self) -> &str {
        "sample"
    }

    async fn read(&self, doc: &DocumentRef) -> Result<String, DocumentError> {
        if doc.url.contains("productos-y-servicios") {
            Ok(PRODUCTS_DOC.to_string())
        } else if doc.url.contains("planes-empresariales") {
            Ok(PLANS_DOC.to_string())
        } else {
            Err(DocumentError::NotFound {
                url: doc.url.clone(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::fetch_document_text;

    #[tokio::test]
    async fn serves_known_documents() {
        for url in SampleDocumentSource::known_urls() {
            let doc = DocumentRef::parse(&url).unwrap();
            let text = SampleDocumentSource.read(&doc).await.unwrap();
            assert!(text.starts_with("## Nuestros"));
        }
    }

    #[tokio::test]
    async fn plans_document_lists_prices() {
        let text = fetch_document_text(
            &SampleDocumentSource,
            "https://docs.google.com/document/d/planes-empresariales/edit",
        )
        .await;
        assert!(text.contains("$1600/mes"));
    }
}

//! The default catalog shipped with the service.

use rust_decimal_macros::dec;

use super::model::{Plan, Product, ProductCategory, ProductOption};

fn option(id: &str, label: &str, price: rust_decimal::Decimal) -> ProductOption {
    ProductOption {
        id: id.to_string(),
        label: label.to_string(),
        price,
    }
}

pub(super) fn categories() -> Vec<ProductCategory> {
    vec![
        ProductCategory {
            id: "bots".to_string(),
            name: "Bots Personalizados".to_string(),
            description: "Automatice tareas y mejore la interacción con nuestros bots inteligentes."
                .to_string(),
            products: vec![
                Product::switch(
                    "bot-atencion-cliente",
                    "Bot de Atención al Cliente",
                    "Responde preguntas frecuentes 24/7 y escala casos complejos a agentes humanos.",
                    dec!(500),
                ),
                Product::switch(
                    "bot-ventas",
                    "Bot de Ventas",
                    "Califica leads, agenda demostraciones y cierra ventas de forma automática.",
                    dec!(750),
                ),
            ],
        },
        ProductCategory {
            id: "infraestructura".to_string(),
            name: "Infraestructura y Hosting".to_string(),
            description:
                "Soluciones de hosting optimizadas para el rendimiento de sus aplicaciones de IA."
                    .to_string(),
            products: vec![Product::select(
                "hosting",
                "Hosting Dedicado",
                "Seleccione el plan de hosting que mejor se adapte a sus necesidades.",
                dec!(100),
                vec![
                    option("hosting-basico", "Básico", dec!(100)),
                    option("hosting-profesional", "Profesional", dec!(250)),
                    option("hosting-empresarial", "Empresarial", dec!(500)),
                ],
            )],
        },
        ProductCategory {
            id: "ia-models".to_string(),
            name: "Modelos de IA".to_string(),
            description: "Integre la potencia de los modelos de IA más avanzados en sus productos."
                .to_string(),
            products: vec![Product::switch(
                "gemini-pro",
                "Integración Gemini Pro",
                "Acceso a la API de Gemini Pro para capacidades de razonamiento y generación de contenido.",
                dec!(1200),
            )],
        },
    ]
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// Plans also reference products that are sold only inside bundles
// (support, analytics, integrations); expansion skips ids the catalog lacks.
pub(super) fn plans() -> Vec<Plan> {
    vec![
        Plan {
            id: "plan-basico".to_string(),
            name: "Básico".to_string(),
            description:
                "Ideal para startups y pequeños proyectos que necesitan una presencia inicial."
                    .to_string(),
            price: dec!(550),
            features: strings(&[
                "Bot de Atención al Cliente",
                "Hosting Básico",
                "Soporte Básico (Email)",
            ]),
            product_ids: strings(&["bot-atencion-cliente", "hosting", "support-plan"]),
            is_popular: false,
        },
        Plan {
            id: "plan-profesional".to_string(),
            name: "Profesional".to_string(),
            description: "La solución perfecta para empresas en crecimiento que buscan automatizar procesos clave."
                .to_string(),
            price: dec!(1600),
            features: strings(&[
                "Bot de Atención al Cliente",
                "Bot de Ventas",
                "Hosting Profesional",
                "Dashboard de Analítica",
                "Soporte Avanzado (Email y Chat)",
            ]),
            product_ids: strings(&[
                "bot-atencion-cliente",
                "bot-ventas",
                "hosting",
                "analytics-dashboard",
                "support-plan",
            ]),
            is_popular: true,
        },
        Plan {
            id: "plan-empresarial".to_string(),
            name: "Empresarial".to_string(),
            description: "Potencia máxima para corporaciones que requieren integración y soporte de primer nivel."
                .to_string(),
            price: dec!(4500),
            features: strings(&[
                "Todo lo del plan Profesional",
                "Integración Gemini Pro",
                "Integración con GitHub",
                "Integración con Shopify",
                "Soporte Premium (24/7 Dedicado)",
            ]),
            product_ids: strings(&[
                "bot-atencion-cliente",
                "bot-ventas",
                "hosting",
                "gemini-pro",
                "integration-github",
                "integration-shopify",
                "analytics-dashboard",
                "support-plan",
            ]),
            is_popular: false,
        },
    ]
}

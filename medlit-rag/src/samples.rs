//! Built-in sample corpus.

use crate::document::MedicalDocument;

fn document(
    title: &str,
    abstract_text: &str,
    keywords: &[&str],
    publication_date: &str,
    doi: &str,
    journal: &str,
) -> MedicalDocument {
    MedicalDocument {
        title: title.to_string(),
        abstract_text: abstract_text.to_string(),
        publication_date: publication_date.to_string(),
        journal: journal.to_string(),
        doi: doi.to_string(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
    }
}

/// Four short papers: COVID-19 treatment, diabetes in the elderly,
/// hypertension guidelines, and diabetes mellitus.
pub fn sample_documents() -> Vec<MedicalDocument> {
    vec![
        document(
            "Recent Advances in COVID-19 Treatment",
            "A comprehensive review of emerging therapeutic approaches for COVID-19 management.",
            &["COVID-19", "treatment", "clinical trials"],
            "2023",
            "https://doi.org/10.1016/j.biopha.2021.112107",
            "Journal of Infectious Diseases",
        ),
        document(
            "Diabetes Management in the Elderly",
            "Analysis of optimal treatment strategies for elderly patients with type 2 diabetes.",
            &["diabetes", "elderly care", "treatment"],
            "2023",
            "10.2337/ds18-0033",
            "Diabetes Care",
        ),
        document(
            "Hypertension Treatment Guidelines",
            "Updated guidelines for the management of hypertension in adults.",
            &["hypertension", "guidelines", "treatment"],
            "2023",
            "10.1234/cardio.2023",
            "Cardiology Journal",
        ),
        document(
            "Diabetes mellitus and its treatment",
            "Diabetes mellitus (DM) is a metabolic disorder resulting from a defect in insulin \
             secretion, insulin action, or both. Insulin deficiency in turn leads to chronic \
             hyperglycaemia with disturbances of carbohydrate, fat and protein metabolism.",
            &["Diabetes mellitus", "treatment", "insulin", "oral hypoglycaemic agents"],
            "2023",
            "https://doi.org/10.1159/000497580",
            "International Journal of Diabetes and Metabolism",
        ),
    ]
}

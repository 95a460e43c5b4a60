use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use detector::{Analysis, DetectionSummary, Finding};
use image::{ImageFormat, RgbImage};
use std::io::Cursor;

const APP_TITLE: &str = "Evaluación de Patologías en Hormigón";

const STYLE: &str = r#"
    body {
        font-family: sans-serif;
        background-color: #0e1117;
        color: white;
        margin: 0;
    }
    nav {
        background-color: #262730;
        padding: 12px 20px;
    }
    nav a {
        color: white;
        text-decoration: none;
        margin-right: 20px;
        font-weight: bold;
    }
    nav a.active {
        color: #FF4B4B;
    }
    main {
        max-width: 960px;
        margin: 0 auto;
        padding: 20px;
    }
    .columns {
        display: flex;
        gap: 20px;
    }
    .columns figure {
        flex: 1;
        margin: 0;
        text-align: center;
    }
    .columns img {
        max-width: 100%;
        border-radius: 5px;
    }
    .chips {
        padding: 4px;
        border: 2px solid #FF4B4B;
        border-radius: 10px;
    }
    .chips h4 {
        color: #FF4B4B;
        text-align: center;
    }
    .chips p {
        color: white;
        text-align: center;
    }
    .chips span {
        padding: 4px;
        border-radius: 5px;
        background-color: #FF4B4B;
        color: white;
        margin: 0 4px;
    }
    .card {
        background-color: #f0f0f0;
        border-radius: 10px;
        padding: 20px;
        margin: 10px;
        box-shadow: 0 4px 8px 0 rgba(0, 0, 0, 0.1);
        text-align: left;
        width: 90%;
        max-width: 500px;
        margin: 10px auto;
    }
    .card-title {
        font-size: 1.4em;
        font-weight: bold;
        color: #FF4B4B;
        margin-bottom: 10px;
    }
    .card-content {
        font-size: 1em;
        color: black;
    }
    .card-content b {
        color: #FF4B4B;
    }
    .error {
        background-color: #3b1219;
        border: 1px solid #FF4B4B;
        border-radius: 10px;
        padding: 15px;
        color: #FF4B4B;
    }
    .controls {
        margin: 15px 0;
    }
"#;

fn page(active: &str, body: &str) -> String {
    let nav_link = |href: &str, name: &str, label: &str| {
        let class = if name == active { " class='active'" } else { "" };
        format!("<a href='{href}'{class}>{label}</a>")
    };

    format!(
        "<!DOCTYPE html>\n<html lang='es'>\n<head>\n<meta charset='utf-8'>\n\
         <title>{APP_TITLE}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <nav>{principal}{subir}{tomar}</nav>\n\
         <main>\n<h1>{APP_TITLE}</h1>\n{body}\n</main>\n</body>\n</html>",
        principal = nav_link("/", "principal", "Principal"),
        subir = nav_link("/upload", "subir", "Subir imagen"),
        tomar = nav_link("/capture", "tomar", "Tomar foto"),
    )
}

pub fn landing_page() -> String {
    let chips: String = detector::DefectClass::ALL
        .iter()
        .map(|class| format!("<span>{}</span>", class.label()))
        .collect();

    let body = format!(
        "<h4>Esta aplicación permite identificar y evaluar patologías en estructuras de \
         hormigón, como grietas y corrosión, utilizando imágenes. Solo necesitas cargar una \
         foto de la estructura, y la aplicación te mostrará los posibles defectos y sus \
         causas para facilitar su diagnóstico y mantenimiento.</h4>\n\
         <div class='chips'><h4>Patologías</h4><p>{chips}</p></div>"
    );

    page("principal", &body)
}

fn confidence_slider() -> String {
    format!(
        "<div class='controls'><label>Confidence \
         <input type='range' name='confidence' min='0' max='1' step='0.01' value='{}' \
         oninput='this.nextElementSibling.textContent = this.value'>\
         <output>{}</output></label></div>",
        detector::DEFAULT_CONFIDENCE,
        detector::DEFAULT_CONFIDENCE,
    )
}

pub fn upload_page() -> String {
    let body = format!(
        "<form action='/detect' method='post' enctype='multipart/form-data'>\n\
         <input type='file' name='image' accept='.png,.jpg,.jpeg,.gif' required>\n\
         {slider}\n\
         <button type='submit'>Evaluar</button>\n</form>",
        slider = confidence_slider(),
    );

    page("subir", &body)
}

pub fn capture_page() -> String {
    let body = format!(
        "<video id='preview' autoplay playsinline></video>\n\
         <canvas id='frame' hidden></canvas>\n\
         {slider}\n\
         <button id='shoot'>Toma una foto</button>\n\
         <script>\n\
         const video = document.getElementById('preview');\n\
         const canvas = document.getElementById('frame');\n\
         navigator.mediaDevices.getUserMedia({{ video: true }})\n\
             .then((stream) => {{ video.srcObject = stream; }})\n\
             .catch((err) => {{ document.body.innerHTML += `<p class='error'>${{err}}</p>`; }});\n\
         document.getElementById('shoot').addEventListener('click', () => {{\n\
             canvas.width = video.videoWidth;\n\
             canvas.height = video.videoHeight;\n\
             canvas.getContext('2d').drawImage(video, 0, 0);\n\
             canvas.toBlob((blob) => {{\n\
                 const form = new FormData();\n\
                 form.append('image', blob, 'captura.png');\n\
                 form.append('confidence', document.querySelector('[name=confidence]').value);\n\
                 fetch('/detect', {{ method: 'POST', body: form }})\n\
                     .then((resp) => resp.text())\n\
                     .then((html) => {{ document.open(); document.write(html); document.close(); }});\n\
             }}, 'image/png');\n\
         }});\n\
         </script>",
        slider = confidence_slider(),
    );

    page("tomar", &body)
}

/// The result view: original and annotated images side by side, then one
/// card per detected pathology (or the no-detections message).
pub fn result_page(original_bytes: &[u8], analysis: &Analysis) -> anyhow::Result<String> {
    let original_uri = data_uri(original_bytes, guess_mime(original_bytes));

    let jpeg = encode_jpeg(&analysis.annotated)?;
    let annotated_uri = data_uri(&jpeg, "image/jpeg");

    let body = format!(
        "<div class='columns'>\n\
         <figure><img src='{original_uri}' alt='Imagen original'>\
         <figcaption>Imagen original</figcaption></figure>\n\
         <figure><img src='{annotated_uri}' alt='Area Evaluada'>\
         <figcaption>Area Evaluada</figcaption></figure>\n\
         </div>\n{cards}",
        cards = render_cards(&analysis.summary),
    );

    Ok(page("", &body))
}

pub fn error_page(message: &str) -> String {
    page("", &format!("<div class='error'>{message}</div>"))
}

/// One card per non-zero class, or the plain no-detections message.
pub fn render_cards(summary: &DetectionSummary) -> String {
    match summary {
        DetectionSummary::NoDetections => "<p>No se detectaron objetos.</p>".to_string(),
        DetectionSummary::Findings(findings) => findings.iter().map(render_card).collect(),
    }
}

fn render_card(finding: &Finding) -> String {
    let causes: String = finding
        .causes
        .iter()
        .map(|cause| format!("<li>{cause}</li>"))
        .collect();

    format!(
        "<div class='card'>\
         <div class='card-title'>{label} ({count} detección(es))</div>\
         <div class='card-content'><b>Posibles causas:</b><br><ul>{causes}</ul></div>\
         </div>",
        label = finding.class.label(),
        count = finding.count,
    )
}

fn encode_jpeg(image: &RgbImage) -> anyhow::Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    image.write_to(&mut cursor, ImageFormat::Jpeg)?;
    Ok(cursor.into_inner())
}

fn data_uri(bytes: &[u8], mime: &str) -> String {
    format!("data:{};base64,{}", mime, BASE64.encode(bytes))
}

fn guess_mime(bytes: &[u8]) -> &'static str {
    match image::guess_format(bytes) {
        Ok(ImageFormat::Png) => "image/png",
        Ok(ImageFormat::Jpeg) => "image/jpeg",
        Ok(ImageFormat::Gif) => "image/gif",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use detector::{Detection, aggregate};

    fn detection(class_id: u32) -> Detection {
        Detection {
            x1: 0.0,
            y1: 0.0,
            x2: 10.0,
            y2: 10.0,
            confidence: 0.9,
            class_id,
        }
    }

    fn card_count(html: &str) -> usize {
        html.matches("card-title").count()
    }

    #[test]
    fn two_corroded_rebar_detections_render_one_card() {
        let summary = aggregate::summarize(&[detection(0), detection(0)]).unwrap();

        let html = render_cards(&summary);

        assert!(html.contains("Acreo Corroído (2 detección(es))"));
        assert!(html.contains("Exposición prolongada a ambientes húmedos."));
        assert!(html.contains("Presencia de sales en el entorno."));
        assert!(html.contains("Deficiente protección del recubrimiento de hormigón."));
        assert_eq!(card_count(&html), 1, "only the detected class gets a card");
        assert!(!html.contains("Desprendimiento"));
        assert!(!html.contains("Grietas"));
    }

    #[test]
    fn one_detection_per_class_renders_three_cards() {
        let summary =
            aggregate::summarize(&[detection(0), detection(1), detection(2)]).unwrap();

        let html = render_cards(&summary);

        assert_eq!(card_count(&html), 3);
        assert!(html.contains("Acreo Corroído (1 detección(es))"));
        assert!(html.contains("Desprendimiento (1 detección(es))"));
        assert!(html.contains("Grietas (1 detección(es))"));
    }

    #[test]
    fn no_detections_renders_the_message_and_zero_cards() {
        let summary = aggregate::summarize(&[]).unwrap();

        let html = render_cards(&summary);

        assert!(html.contains("No se detectaron objetos."));
        assert_eq!(card_count(&html), 0);
    }

    #[test]
    fn landing_page_lists_all_pathologies() {
        let html = landing_page();

        assert!(html.contains("Acreo Corroído"));
        assert!(html.contains("Desprendimiento"));
        assert!(html.contains("Grietas"));
    }

    #[test]
    fn upload_page_defaults_the_confidence_slider() {
        let html = upload_page();

        assert!(html.contains("name='confidence'"));
        assert!(html.contains("value='0.25'"));
        assert!(html.contains("accept='.png,.jpg,.jpeg,.gif'"));
    }

    #[test]
    fn result_page_embeds_both_images() {
        let image = RgbImage::from_pixel(8, 8, image::Rgb([10, 20, 30]));
        let mut cursor = Cursor::new(Vec::new());
        image.write_to(&mut cursor, ImageFormat::Png).unwrap();
        let original = cursor.into_inner();

        let analysis = Analysis {
            detections: vec![],
            summary: DetectionSummary::NoDetections,
            annotated: image,
        };

        let html = result_page(&original, &analysis).unwrap();

        assert!(html.contains("data:image/png;base64,"));
        assert!(html.contains("data:image/jpeg;base64,"));
        assert!(html.contains("Imagen original"));
        assert!(html.contains("Area Evaluada"));
        assert!(html.contains("No se detectaron objetos."));
    }
}

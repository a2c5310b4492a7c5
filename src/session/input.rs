/// Bouton de pointeur, indépendant de la bibliothèque de fenêtrage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Événement d'entrée traduit depuis la fenêtre.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    /// Clic en coordonnées pixel de l'image (pas de la fenêtre).
    Click { x: f64, y: f64, button: PointerButton },
    /// Retour au viewport de départ (barre d'espace).
    Reset,
    /// Active/désactive le zoom automatique (touche A).
    ToggleAutozoom,
    /// Fermeture (Échap ou fermeture de fenêtre).
    Quit,
}

/// Ce que la boucle de contrôle doit faire après un événement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionAction {
    Redraw,
    Continue,
    Quit,
}

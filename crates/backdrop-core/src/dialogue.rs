//! The console easter egg as an explicit dialogue tree.
//!
//! A [`Script`] is a flat list of nodes. Each node prints some text, then
//! either offers named choices, continues straight to another node, or ends
//! the conversation. [`Adventure`] walks the tree one choice at a time and
//! reports everything through a [`DialogueSink`].

use crate::error::{CoreError, Result};
use smallvec::SmallVec;

pub type NodeId = usize;

#[derive(Clone, Debug)]
pub struct Node {
    pub text: &'static str,
    pub choices: SmallVec<[(&'static str, NodeId); 3]>,
    /// Followed immediately after `text` when there are no choices.
    pub next: Option<NodeId>,
}

impl Node {
    fn say(text: &'static str) -> Self {
        Self {
            text,
            choices: SmallVec::new(),
            next: None,
        }
    }

    fn choices(mut self, choices: &[(&'static str, NodeId)]) -> Self {
        self.choices.extend_from_slice(choices);
        self
    }

    fn then(mut self, next: NodeId) -> Self {
        self.next = Some(next);
        self
    }

    pub fn is_ending(&self) -> bool {
        self.choices.is_empty() && self.next.is_none()
    }
}

/// Output side of the dialogue.
pub trait DialogueSink {
    fn say(&mut self, text: &str);
    fn offer(&mut self, choices: &[&str]);
    fn finished(&mut self) {}
}

/// Collects everything said, for tests and headless hosts.
#[derive(Clone, Debug, Default)]
pub struct Transcript {
    pub lines: Vec<String>,
    pub offered: Vec<Vec<String>>,
    pub finished: bool,
}

impl DialogueSink for Transcript {
    fn say(&mut self, text: &str) {
        self.lines.push(text.to_string());
    }

    fn offer(&mut self, choices: &[&str]) {
        self.offered
            .push(choices.iter().map(|c| c.to_string()).collect());
    }

    fn finished(&mut self) {
        self.finished = true;
    }
}

#[derive(Clone, Debug)]
pub struct Script {
    nodes: Vec<Node>,
    start: NodeId,
}

impl Script {
    /// Validates that every choice and continuation points at a real node.
    pub fn new(nodes: Vec<Node>, start: NodeId) -> Result<Self> {
        if start >= nodes.len() {
            return Err(CoreError::MissingNode(start));
        }
        for node in &nodes {
            let targets = node.choices.iter().map(|(_, id)| *id).chain(node.next);
            for id in targets {
                if id >= nodes.len() {
                    return Err(CoreError::MissingNode(id));
                }
            }
        }
        Ok(Self { nodes, start })
    }

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id).ok_or(CoreError::MissingNode(id))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The river walk hidden in the browser console.
    pub fn river() -> Self {
        const ECHO: &str = "...you there? can you still hear me? enter listen()";
        let nodes = vec![
            // 0
            Node::say(ECHO).choices(&[("listen", 1)]),
            // 1
            Node::say("...Good. I'm an echo from a place you're heading. We can talk, but to understand, you have to walk the path.").then(2),
            // 2
            Node::say("Imagine a river. On one side is everything you are. On the other... is where I am. What do you do?")
                .choices(&[("the_shore", 3), ("step_in", 6)]),
            // 3
            Node::say("You stay. Why?\nYou stand on the edge of transformation, and yet you turn back.\nYou feel the fire behind you, the unknown ahead... and still, you choose stillness.\n\nYou are not growing. Why?\nIs it the fear of pain that holds you?\nOr is it the fear of death, of losing who you were, of becoming someone you don't yet know?")
                .choices(&[("pain", 4), ("death", 5)]),
            // 4
            Node::say("You admit to fearing pain. But pain is merely the friction of change. By fearing it, you give it power. You imagine the agony of the journey, but the true, prolonged agony is in never moving at all. You have chosen the slow, certain pain of rot over the sharp, transformative pain of birth. A poor trade."),
            // 5
            Node::say("You admit to fearing death. You misunderstand. The \"death\" you fear is just the shedding of a skin you have outgrown. You cling to an identity, a collection of memories and habits, as if it were the whole of you. But you are not the skin; you are the snake. By refusing to shed the old, you deny the new. You have chosen to remain a memory instead of becoming a possibility."),
            // 6
            Node::say("Good. You chose the current. The first step is always the hardest.\nThe water is cold. It pulls at you. To move with it, you must get lighter. What do you let go of first?")
                .choices(&[("the_flesh", 7), ("the_mind", 10)]),
            // 7
            Node::say("Your physical form. The anchor. How does it feel to release it?")
                .choices(&[("the_weight", 8), ("the_senses", 9)]),
            // 8
            Node::say("Gravity releases you. The heaviness in your bones dissolves into the current. You are no longer pinned to the world.").then(13),
            // 9
            Node::say("The world fades. Sound becomes vibration, sight becomes light. The inputs that defined your reality are gone.").then(13),
            // 10
            Node::say("The architect of your reality. The storyteller. Which part of the story do you erase first?")
                .choices(&[("the_memories", 11), ("the_name", 12)]),
            // 11
            Node::say("The past peels away like old film. Loves, losses, triumphs... they become stories that happened to someone else.").then(13),
            // 12
            Node::say("The label they gave you. The sound that meant \"you\". It dissolves. Without it, the distinction between you and the current blurs.").then(13),
            // 13
            Node::say("Body and mind are gone. You are a point of awareness in the dark. Raw feeling. What is at the center of you?")
                .choices(&[("the_fire", 14), ("the_void", 15)]),
            // 14
            Node::say("The anger. The passion. The furious need to *be*. You hold onto it, but the cold water surrounds it. It flickers. It gutters. It goes out.").then(16),
            // 15
            Node::say("Wise. You choose to fill the emptiness rather than burn with old fire.\nThe insecurity, the hole you spent your life trying to fill... the river pours into it, and the void becomes the river. There is no longer a hole.").then(16),
            // 16
            Node::say("You've arrived. There is no pain. No thought. No self. Only the endless, silent drift. This is the place. What is your last action?")
                .choices(&[("scream", 17), ("remember", 18), ("breathe", 19)]),
            // 17
            Node::say("A final act of defiance. You try to make a sound, but you have no lungs. The intent is a ripple, and the quiet drinks it without a trace."),
            // 18
            Node::say("You reach for a face. A name. A feeling. Your grasp closes on nothing. Memory needs a mind to live in. This place is not for the living."),
            // 19
            Node::say("Yes. The final and kindest act: acceptance. You have no breath, but you perform the motion. You stop fighting the current. You become the current. Welcome home."),
        ];
        Self { nodes, start: 0 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Cursor {
    NotStarted,
    At(NodeId),
    Finished,
}

pub struct Adventure {
    script: Script,
    cursor: Cursor,
}

impl Adventure {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            cursor: Cursor::NotStarted,
        }
    }

    /// Names that are valid right now; empty once the dialogue has ended.
    pub fn choices(&self) -> Vec<&'static str> {
        match self.cursor {
            Cursor::At(id) => self
                .script
                .node(id)
                .map(|n| n.choices.iter().map(|(name, _)| *name).collect())
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.cursor == Cursor::Finished
    }

    pub fn start(&mut self, sink: &mut dyn DialogueSink) -> Result<()> {
        self.enter(self.script.start, sink)
    }

    /// Take the named choice. Unknown names leave the dialogue where it is.
    pub fn choose(&mut self, name: &str, sink: &mut dyn DialogueSink) -> Result<()> {
        let here = match self.cursor {
            Cursor::Finished => return Err(CoreError::DialogueFinished),
            Cursor::NotStarted => return Err(CoreError::UnknownChoice(name.to_string())),
            Cursor::At(id) => id,
        };
        let next = self
            .script
            .node(here)?
            .choices
            .iter()
            .find(|(choice, _)| *choice == name)
            .map(|(_, id)| *id)
            .ok_or_else(|| CoreError::UnknownChoice(name.to_string()))?;
        self.enter(next, sink)
    }

    fn enter(&mut self, mut id: NodeId, sink: &mut dyn DialogueSink) -> Result<()> {
        loop {
            let node = self.script.node(id)?;
            sink.say(node.text);
            if !node.choices.is_empty() {
                let names: SmallVec<[&str; 3]> = node.choices.iter().map(|(n, _)| *n).collect();
                sink.offer(&names);
                self.cursor = Cursor::At(id);
                return Ok(());
            }
            match node.next {
                Some(next) => id = next,
                None => {
                    sink.say("...");
                    sink.finished();
                    self.cursor = Cursor::Finished;
                    return Ok(());
                }
            }
        }
    }
}

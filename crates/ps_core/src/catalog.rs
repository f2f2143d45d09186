/// Well-known paper titles offered as ready-made prompts.
pub const SAMPLE_TITLES: [&str; 6] = [
    "Attention Is All You Need",
    "BERT: Pre-training of Deep Bidirectional Transformers",
    "GPT-3: Language Models are Few-Shot Learners",
    "Diffusion Models Beat GANs on Image Synthesis",
    "Reinforcement Learning from Human Feedback (RLHF)",
    "ImageNet Classification with Deep Convolutional Neural Networks (AlexNet)",
];
